use crate::record::Record;

/// Trait for components that consume decoded records
///
/// Lets the main loop hand every record to each consumer without knowing
/// what the consumer does with it.
pub trait RecordHandler {
    fn handle_record(&mut self, record: &Record);
}
