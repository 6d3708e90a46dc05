use brainbites_quiz::quiz::source::CsvSource;
use brainbites_quiz::quiz::storage::FileStorage;
use brainbites_quiz::{QuizConfig, QuizService};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // A missing .env is fine, the defaults cover everything
    dotenv().ok();
    pretty_env_logger::init();

    let config = QuizConfig::from_env()?;
    log::info!("Starting quiz service with {:?}", config);

    let source = CsvSource::new(&config.data_path);
    let storage = FileStorage::new(&config.storage_dir);
    let service = QuizService::initialize(&source, storage, config.options()).await;

    for category in service.list_categories().await {
        let question = service.select_question(&category).await;
        let progress = service.progress(&category).await;
        println!(
            "[{}] {}/{} seen\n{}",
            category,
            progress.used,
            progress.total,
            serde_json::to_string_pretty(&question)?
        );
    }

    service.shutdown().await?;
    Ok(())
}
