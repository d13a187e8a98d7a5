use log::info;
use mongodb::{options::ClientOptions, Client, Database};

pub struct MongoDB {
    pub client: Client,
    pub db: Database,
}

impl MongoDB {
    pub async fn init(uri: &str, db_name: &str) -> mongodb::error::Result<Self> {
        let mut client_options = ClientOptions::parse(uri).await?;
        client_options.app_name = Some("gearguard".to_string());
        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);
        info!("Using MongoDB database {}", db_name);
        Ok(MongoDB { client, db })
    }
}
