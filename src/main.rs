use krewe_newsletter::{config::get_or_init_config, App, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // We have a different logging mechanism for production
    #[cfg(not(debug_assertions))]
    {
        krewe_newsletter::init_production_tracing()
    }
    #[cfg(debug_assertions)]
    {
        krewe_newsletter::init_dbg_tracing();
    }

    let config = get_or_init_config().clone();
    let app = App::build_from_config(config).await?;

    krewe_newsletter::serve(app).await?;

    Ok(())
}
