use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use super::topic::Topic;
use super::message::Message;

//read handle on a topic; remembers the newest epoch it has shown its owner
pub struct Subscriber<T: Message>{
    topic: Arc<Topic<T>>,
    seen: AtomicU64,
}

impl<T: Message> Subscriber<T>{
    pub fn new(topic: Arc<Topic<T>>) -> Self{
        Subscriber{ topic, seen: AtomicU64::new(0) }
    }

    //consumes from the shared queue, so other subscribers on the topic miss it
    pub fn try_recv(&self) -> Option<T>{
        let msg = self.topic.try_receive()?;
        Some(msg)
    }

    pub fn peek_latest(&self) -> Option<(T, u64)>{
        self.topic.peek_latest()
    }

    //UI-style read: newest sample, at most once per epoch
    pub fn latest_if_new(&self) -> Option<T>{
        let (msg, epoch) = self.topic.peek_latest()?;
        let previous = self.seen.fetch_max(epoch, Ordering::AcqRel);
        (epoch > previous).then_some(msg)
    }

    pub fn has_new(&self) -> bool{
        self.topic.latest_epoch() > self.seen_epoch()
    }

    pub fn mark_seen(&self){
        self.seen.fetch_max(self.topic.latest_epoch(), Ordering::AcqRel);
    }

    pub fn seen_epoch(&self) -> u64{
        self.seen.load(Ordering::Acquire)
    }

    pub fn topic_name(&self) -> &str{
        self.topic.name()
    }
}
