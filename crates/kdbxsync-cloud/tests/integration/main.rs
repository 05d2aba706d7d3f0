//! Integration tests for kdbxsync-cloud
//!
//! Uses wiremock to simulate the Yandex and Google OAuth and upload APIs
//! and drives the providers through their full lifecycle against a
//! temporary state store and a scripted console.

mod common;

mod test_google;
