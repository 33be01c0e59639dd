use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

use log::{error, info};

use crate::geo::LatLng;
use crate::path::{Path, PathError, PathRequest, PathResponse, PathService};

pub const PATH_FAILED_ALERT: &str = "Failed to fetch the path. Please check your addresses.";

/// Owns the two addresses and the route between them
pub struct PageController {
    pub start_address: String,
    pub end_address: String,
    path: Option<Path>,
    /// Bumped for every path received, identical or not
    path_revision: u64,
    directions: Vec<String>,
    loading: bool,
    alert: Option<String>,
    service: Rc<dyn PathService>,
    results_tx: Sender<Result<PathResponse, PathError>>,
    results_rx: Receiver<Result<PathResponse, PathError>>,
}

impl PageController {
    pub fn new(service: Rc<dyn PathService>) -> Self {
        let (results_tx, results_rx) = channel();
        Self {
            start_address: String::new(),
            end_address: String::new(),
            path: None,
            path_revision: 0,
            directions: Vec::new(),
            loading: false,
            alert: None,
            service,
            results_tx,
            results_rx,
        }
    }

    pub fn path(&self) -> Option<&[LatLng]> {
        self.path.as_deref()
    }

    pub fn path_revision(&self) -> u64 {
        self.path_revision
    }

    pub fn directions(&self) -> &[String] {
        &self.directions
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message to show the user, it stays until dismissed
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Request the path between the current addresses. Returns false and does nothing while a
    /// request is already outstanding.
    pub fn find_path(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;

        let request = PathRequest {
            start_address: self.start_address.clone(),
            end_address: self.end_address.clone(),
        };
        info!(
            "finding path from {:?} to {:?}",
            request.start_address, request.end_address
        );

        let tx = self.results_tx.clone();
        self.service.shortest_path(
            request,
            Box::new(move |result| {
                let _ = tx.send(result);
            }),
        );
        true
    }

    /// Apply a settled request, if any
    pub fn poll(&mut self) {
        while let Ok(result) = self.results_rx.try_recv() {
            self.loading = false;
            match result {
                Ok(response) => {
                    info!("received path with {} points", response.path.len());
                    self.path = Some(response.path);
                    self.path_revision += 1;
                    self.directions = response.directions;
                }
                Err(e) => {
                    error!("Error fetching path: {}", e);
                    self.alert = Some(PATH_FAILED_ALERT.to_string());
                }
            }
        }
    }
}
