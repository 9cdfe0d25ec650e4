use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "kafka-worker", about = "Consumes JSON messages from kafka topics")]
pub struct Cli {
    /// The consumer ID to use for the kafka consumer group
    #[arg(short = 'c', long = "consumer-id", env = "KAFKA_WORKER_CONSUMER_ID")]
    pub consumer_id: Option<String>,

    /// Settings file name, the extension is optional
    #[arg(long, default_value = "appsettings")]
    pub config: String,
}
