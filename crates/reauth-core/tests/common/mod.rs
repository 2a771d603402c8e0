//! Common test utilities for reauth-core integration tests

pub mod mock_repos;

#[allow(unused_imports)]
pub use mock_repos::MockSessionRepository;
