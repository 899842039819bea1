mod common;

mod probe_tests;
