#[derive(Debug, PartialEq, Clone, Copy)]
pub enum LoaderState {
    Idle,    // Not started, or inert because the overlay is missing
    Pending, // Overlay showing, waiting for media or a timer
    Hidden,  // Overlay gone for good
}
