pub mod gateway_client;
pub mod transport;

pub use gateway_client::GatewayClient;
pub use transport::{HttpTransport, RawResponse, Transport};
