//! Interactive widget state.

pub mod widget_state;

pub use widget_state::{StateChange, WidgetStates, WidgetValue};
