pub trait Message: Clone + Send + 'static{}

//blanket impl, telemetry payloads are plain Copy structs
impl<T: Clone + Send + 'static> Message for T{}
