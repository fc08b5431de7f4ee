mod dispatcher;

pub use dispatcher::{Dispatcher, Inbound, Routed};
