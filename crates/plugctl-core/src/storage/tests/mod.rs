mod trash_tests;
