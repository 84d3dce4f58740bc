use common_kafka::config::KafkaConfig;
use envconfig::Envconfig;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(default = "foo-topic")]
    pub kafka_topic: String,

    // Fixed partition key, so one invocation's messages land in order
    #[envconfig(default = "bar-key")]
    pub kafka_key: String,

    #[envconfig(nested = true)]
    pub kafka: KafkaConfig,
}
