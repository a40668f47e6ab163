pub mod lodgify_client;
