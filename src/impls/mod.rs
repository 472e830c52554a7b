mod refresh_processor;
