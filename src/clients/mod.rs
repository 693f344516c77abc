pub mod api;
pub mod http_client;
pub mod mock_client;

pub use api::ProblemApi;
pub use http_client::HttpProblemApi;
pub use mock_client::MockProblemApi;
