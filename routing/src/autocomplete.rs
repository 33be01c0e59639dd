use std::rc::Rc;
use std::sync::mpsc::{channel, Receiver, Sender};

use log::{debug, error};

use crate::event::{Dispatcher, Listener, PointerDown, ScreenRect};
use crate::suggest::{Lookup, SuggestionService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocompleteState {
    /// No suggestions are shown
    Idle,
    /// A non-empty suggestion list is shown below the input
    Suggesting,
}

/// Set when a suggestion row is pressed, consumed by the next pointer-down dispatch. Pressing a
/// suggestion is itself a pointer-down, and it must not count as a click outside the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionGuard {
    #[default]
    Idle,
    PendingSelect,
}

/// State behind a controlled address input with place suggestions.
///
/// The text itself is owned by the caller and handed in through [`AddressAutocomplete::update`]
/// every frame. Dropping the value unregisters its pointer listener.
pub struct AddressAutocomplete {
    service: Option<Rc<dyn SuggestionService>>,
    suggestions: Vec<String>,
    guard: SelectionGuard,
    last_value: Option<String>,
    input_rect: Option<ScreenRect>,
    pointer: Listener<PointerDown>,
    lookups_tx: Sender<Lookup>,
    lookups_rx: Receiver<Lookup>,
    pending: usize,
}

impl AddressAutocomplete {
    /// Without a service suggestions stay disabled for the lifetime of this value
    pub fn mount(
        service: Option<Rc<dyn SuggestionService>>,
        pointer: &Dispatcher<PointerDown>,
    ) -> Self {
        if service.is_none() {
            error!("place suggestion service not available, suggestions are disabled");
        }
        let (lookups_tx, lookups_rx) = channel();

        Self {
            service,
            suggestions: Vec::new(),
            guard: SelectionGuard::Idle,
            last_value: None,
            input_rect: None,
            pointer: pointer.listen(),
            lookups_tx,
            lookups_rx,
            pending: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.service.is_some()
    }

    /// True while lookups are in flight
    pub fn has_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn state(&self) -> AutocompleteState {
        if self.suggestions.is_empty() {
            AutocompleteState::Idle
        } else {
            AutocompleteState::Suggesting
        }
    }

    /// Where the input was drawn last, used to tell clicks inside it from clicks outside
    pub fn set_input_rect(&mut self, rect: ScreenRect) {
        self.input_rect = Some(rect);
    }

    /// Feed the current value of the input. Starts a lookup when it differs from the last value
    /// seen, then applies whatever lookups have completed, in the order they completed.
    pub fn update(&mut self, value: &str) {
        if self.service.is_none() {
            return;
        }
        if self.last_value.as_deref() != Some(value) {
            self.last_value = Some(value.to_owned());
            self.lookup(value);
        }
        self.receive_lookups();
    }

    fn lookup(&mut self, input: &str) {
        if input.is_empty() {
            self.suggestions.clear();
            return;
        }
        let Some(service) = &self.service else {
            return;
        };

        let tx = self.lookups_tx.clone();
        self.pending += 1;
        service.predictions(
            input,
            Box::new(move |lookup| {
                // the receiver is gone once the input is unmounted
                let _ = tx.send(lookup);
            }),
        );
    }

    fn receive_lookups(&mut self) {
        while let Ok(lookup) = self.lookups_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            if lookup.is_ok() {
                self.suggestions = lookup.descriptions;
            } else {
                debug!("lookup returned {:?}, keeping suggestions", lookup.status);
            }
        }
    }

    /// Process pointer-downs dispatched since the last call
    pub fn handle_pointer_events(&mut self) {
        while let Some(event) = self.pointer.pop_event() {
            self.on_pointer_down(event);
        }
    }

    fn on_pointer_down(&mut self, event: PointerDown) {
        if self.guard == SelectionGuard::PendingSelect {
            self.guard = SelectionGuard::Idle;
            return;
        }

        if let Some(rect) = &self.input_rect {
            if !rect.contains(event.x, event.y) {
                self.suggestions.clear();
            }
        }
    }

    /// A pointer went down on the suggestion at `index`
    pub fn press_suggestion(&mut self, index: usize) {
        if index < self.suggestions.len() {
            self.guard = SelectionGuard::PendingSelect;
        }
    }

    /// Accept the suggestion at `index`. Returns the new value for the input and empties the list.
    pub fn select_suggestion(&mut self, index: usize) -> Option<String> {
        let selected = self.suggestions.get(index)?.clone();
        debug!("selected suggestion {:?}", selected);
        self.suggestions.clear();
        Some(selected)
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::*;
    use crate::suggest::{LookupCallback, PlacesStatus};

    /// Records lookups so the test decides when and how each completes
    #[derive(Default)]
    struct FakeSuggestions {
        calls: RefCell<Vec<(String, Option<LookupCallback>)>>,
    }

    impl SuggestionService for FakeSuggestions {
        fn predictions(&self, input: &str, respond: LookupCallback) {
            self.calls
                .borrow_mut()
                .push((input.to_owned(), Some(respond)));
        }
    }

    impl FakeSuggestions {
        fn inputs(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|(i, _)| i.clone()).collect()
        }

        fn respond(&self, call: usize, lookup: Lookup) {
            let respond = self.calls.borrow_mut()[call].1.take().unwrap();
            respond(lookup);
        }
    }

    fn strings(s: &[&str]) -> Vec<String> {
        s.iter().map(|s| s.to_string()).collect()
    }

    const INPUT_RECT: ScreenRect = ScreenRect {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 200.0,
        max_y: 30.0,
    };
    const INSIDE: PointerDown = PointerDown { x: 50.0, y: 15.0 };
    const OUTSIDE: PointerDown = PointerDown { x: 500.0, y: 400.0 };

    fn setup() -> (Rc<FakeSuggestions>, Dispatcher<PointerDown>, AddressAutocomplete) {
        let fake = Rc::new(FakeSuggestions::default());
        let dispatcher = Dispatcher::new();
        let mut ac = AddressAutocomplete::mount(
            Some(fake.clone() as Rc<dyn SuggestionService>),
            &dispatcher,
        );
        ac.set_input_rect(INPUT_RECT);
        (fake, dispatcher, ac)
    }

    /// Type `value` and let the lookup succeed with `results`
    fn suggest(fake: &FakeSuggestions, ac: &mut AddressAutocomplete, value: &str, results: &[&str]) {
        ac.update(value);
        fake.respond(fake.inputs().len() - 1, Lookup::ok(strings(results)));
        ac.update(value);
    }

    #[test]
    fn test_empty_value_does_not_look_up() {
        let (fake, _dispatcher, mut ac) = setup();
        ac.update("");
        assert!(fake.inputs().is_empty());
        assert!(ac.suggestions().is_empty());
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_lookup_uses_full_value_and_keeps_order() {
        let (fake, _dispatcher, mut ac) = setup();

        ac.update("1 Mar");
        assert_eq!(fake.inputs(), strings(&["1 Mar"]));
        assert!(ac.has_pending());

        fake.respond(
            0,
            Lookup::ok(strings(&["1 Market St", "1 Marina Blvd", "1 Market St"])),
        );
        ac.update("1 Mar");

        assert!(!ac.has_pending());
        // same value again does not start another lookup
        assert_eq!(fake.inputs().len(), 1);
        assert_eq!(
            ac.suggestions(),
            strings(&["1 Market St", "1 Marina Blvd", "1 Market St"])
        );
        assert_eq!(ac.state(), AutocompleteState::Suggesting);
    }

    #[test]
    fn test_failed_lookup_keeps_previous_suggestions() {
        let (fake, _dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);

        ac.update("1 Mark");
        fake.respond(1, Lookup::failed(PlacesStatus::OverQueryLimit));
        ac.update("1 Mark");

        assert_eq!(ac.suggestions(), strings(&["1 Market St"]));
    }

    #[test]
    fn test_ok_with_no_results_goes_idle() {
        let (fake, _dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);
        suggest(&fake, &mut ac, "1 Marx", &[]);
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_clearing_input_clears_without_lookup() {
        let (fake, _dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);

        ac.update("");
        assert_eq!(fake.inputs().len(), 1);
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_select_wins_over_outside_click() {
        let (fake, dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St", "1 Marina Blvd"]);

        // press on the row, the same gesture reaches the global listener
        ac.press_suggestion(1);
        dispatcher.dispatch(OUTSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Suggesting);

        // release completes the click
        assert_eq!(ac.select_suggestion(1), Some("1 Marina Blvd".to_string()));
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_guard_is_one_shot() {
        let (fake, dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);

        ac.press_suggestion(0);
        dispatcher.dispatch(OUTSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Suggesting);

        // the gesture was abandoned, the next outside click dismisses
        dispatcher.dispatch(OUTSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_outside_click_dismisses_inside_click_does_not() {
        let (fake, dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);

        dispatcher.dispatch(INSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Suggesting);

        dispatcher.dispatch(OUTSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_press_out_of_range_sets_no_guard() {
        let (fake, dispatcher, mut ac) = setup();
        suggest(&fake, &mut ac, "1 Mar", &["1 Market St"]);

        ac.press_suggestion(5);
        assert_eq!(ac.select_suggestion(5), None);

        dispatcher.dispatch(OUTSIDE);
        ac.handle_pointer_events();
        assert_eq!(ac.state(), AutocompleteState::Idle);
    }

    #[test]
    fn test_unavailable_service_disables_suggestions() {
        let dispatcher = Dispatcher::new();
        let mut ac = AddressAutocomplete::mount(None, &dispatcher);
        assert!(!ac.is_enabled());

        ac.update("1 Mar");
        assert!(ac.suggestions().is_empty());
        assert!(!ac.has_pending());
    }

    #[test]
    fn test_unmount_removes_listener() {
        let fake: Rc<dyn SuggestionService> = Rc::new(FakeSuggestions::default());
        let dispatcher = Dispatcher::new();

        for _ in 0..3 {
            let ac = AddressAutocomplete::mount(Some(fake.clone()), &dispatcher);
            assert_eq!(dispatcher.listener_count(), 1);
            drop(ac);
            assert_eq!(dispatcher.listener_count(), 0);
        }

        // two inputs on the same page each have their own listener
        let _start = AddressAutocomplete::mount(Some(fake.clone()), &dispatcher);
        let _end = AddressAutocomplete::mount(Some(fake), &dispatcher);
        assert_eq!(dispatcher.listener_count(), 2);
    }

    #[test]
    fn test_slow_earlier_lookup_overwrites_newer() {
        let (fake, _dispatcher, mut ac) = setup();

        ac.update("1 M");
        ac.update("1 Ma");
        assert_eq!(fake.inputs(), strings(&["1 M", "1 Ma"]));

        // results are applied in completion order, not keystroke order
        fake.respond(1, Lookup::ok(strings(&["1 Main St"])));
        fake.respond(0, Lookup::ok(strings(&["1 Mission St"])));
        ac.update("1 Ma");

        assert_eq!(ac.suggestions(), strings(&["1 Mission St"]));
        assert!(!ac.has_pending());
    }
}
