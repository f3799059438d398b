use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use super::message::Message;

//bounded queue of (msg, epoch); freshness bias, oldest sample dropped when full
pub struct Topic<T: Message>{
    name: String,
    queue: Mutex<VecDeque<(T, u64)>>,
    write_epoch: AtomicU64,
    capacity: usize,
}

impl<T: Message> Topic<T>{
    pub fn new(name: &str, capacity: usize) -> Self{
        assert!(capacity > 0, "topic capacity must be greater than 0");
        Topic{
            name: name.to_string(),
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            write_epoch: AtomicU64::new(0),
            capacity,
        }
    }

    pub fn name(&self) -> &str{
        &self.name
    }

    //returns the epoch of the published sample (starts at 1)
    pub fn publish(&self, msg: T) -> u64{
        let mut queue = self.lock();
        if queue.len() == self.capacity{
            queue.pop_front();
        }
        let epoch = self.write_epoch.fetch_add(1, Ordering::AcqRel) + 1;
        queue.push_back((msg, epoch));
        epoch
    }

    //oldest unread sample
    pub fn try_receive(&self) -> Option<T>{
        self.lock().pop_front().map(|(msg, _)| msg)
    }

    //newest sample without consuming it
    pub fn peek_latest(&self) -> Option<(T, u64)>{
        self.lock().back().cloned()
    }

    pub fn latest_epoch(&self) -> u64{
        self.write_epoch.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize{
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool{
        self.lock().is_empty()
    }

    pub fn capacity(&self) -> usize{
        self.capacity
    }

    //a panicking subscriber must not take telemetry down with it
    fn lock(&self) -> MutexGuard<'_, VecDeque<(T, u64)>>{
        self.queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests{
    use super::*;
    use crate::fusion::Speed;

    #[test]
    fn test_publish_receive_in_order(){
        let topic: Topic<Speed> = Topic::new("/drone/speed", 8);
        let s1 = Speed{ x: 1.0, y: 0.0, z: 0.0, timestamp: 20 };
        let s2 = Speed{ x: 1.1, y: 0.0, z: 0.0, timestamp: 40 };
        assert_eq!(topic.publish(s1), 1);
        assert_eq!(topic.publish(s2), 2);
        assert_eq!(topic.len(), 2);
        assert_eq!(topic.name(), "/drone/speed");
        assert_eq!(topic.try_receive(), Some(s1));
        assert_eq!(topic.try_receive(), Some(s2));
        assert!(topic.try_receive().is_none());
    }

    #[test]
    fn test_full_topic_drops_oldest(){
        let topic: Topic<i32> = Topic::new("/test", 3);
        for i in 0..5{
            topic.publish(i);
        }
        assert_eq!(topic.len(), 3);
        assert_eq!(topic.latest_epoch(), 5);
        assert_eq!(topic.try_receive(), Some(2));
    }

    #[test]
    fn test_peek_latest_does_not_consume(){
        let topic: Topic<[f64; 3]> = Topic::new("/drone/location", 8);
        topic.publish([0.0, 0.0, 0.0]);
        topic.publish([0.0, 1.0, 0.0]);
        let (val, epoch) = topic.peek_latest().unwrap();
        assert_eq!(val, [0.0, 1.0, 0.0]);
        assert_eq!(epoch, 2);
        assert_eq!(topic.len(), 2);
    }
}
