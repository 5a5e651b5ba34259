pub mod payment_writer;
pub mod roster_reader;
