//! Pipeline tests against in-process doubles for the LLM, vector stores and
//! web providers.

mod mocks;
