mod handle_concurrency_test;
