mod sink_consumer;

pub use sink_consumer::SinkConsumer;
