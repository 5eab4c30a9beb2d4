#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    trainer_booking::run().await;
}
