mod ice_server;

pub use ice_server::IceServer;
