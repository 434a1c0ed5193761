mod catalog_tests;
mod health_tests;
