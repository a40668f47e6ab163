#[tokio::main]
async fn main() {
    rental_calendar::run().await;
}
