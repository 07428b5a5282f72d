pub mod client;
pub mod mock_server;
