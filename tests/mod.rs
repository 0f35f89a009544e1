mod client_tests;
mod server_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Config and view state wiring
// - server_tests: The mock API driven through the router without a socket
// - client_tests: The HTTP client against a mock API on a loopback port
// - query_cache_tests: Fetch de-duplication and invalidation with a mocked API
// - date_properties: Property tests for the date helpers
