use crate::domain::payment::PaymentView;
use crate::error::Result;
use std::io::Write;

/// Writes payment listings as CSV, one row per submitted payment.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_payments(&mut self, payments: &[PaymentView]) -> Result<()> {
        if payments.is_empty() {
            self.writer.write_record([
                "student_id",
                "name",
                "email",
                "grade",
                "transaction_id",
                "amount",
                "payment_status",
                "updated_at",
            ])?;
        }
        for payment in payments {
            self.writer.serialize(payment)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
