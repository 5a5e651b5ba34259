use crate::domain::document::now_iso;
use crate::domain::payment::{
    PARENT_STUDENTS, ParentAccount, PaymentStatus, PaymentView, StatusChange,
    StudentPaymentRecord, TransitionPolicy,
};
use crate::domain::ports::DocumentStoreRef;
use crate::error::{AdminError, Result};
use tracing::{error, info, warn};

/// Reconciles fee payments recorded inside parent documents.
///
/// Every call re-reads the whole `parent_students` collection; nothing is
/// cached. A status change is a read followed by a whole-array write of one
/// parent document, with no version check in between: two concurrent changes
/// to students of the same parent race and the later write wins.
#[derive(Clone)]
pub struct PaymentService {
    store: DocumentStoreRef,
    policy: TransitionPolicy,
}

impl PaymentService {
    /// Creates a service that permits re-deciding an already decided payment.
    pub fn new(store: DocumentStoreRef) -> Self {
        Self::with_policy(store, TransitionPolicy::default())
    }

    pub fn with_policy(store: DocumentStoreRef, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    async fn parent_accounts(&self) -> Result<Vec<ParentAccount>> {
        let documents = self
            .store
            .scan_collection(PARENT_STUDENTS)
            .await
            .inspect_err(|e| error!("Failed to scan {}: {}", PARENT_STUDENTS, e))?;

        Ok(documents
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                let account = ParentAccount::from_document(doc);
                if account.is_none() {
                    warn!(parent = %id, "Skipping parent document without a students array");
                }
                account
            })
            .collect())
    }

    /// Every submitted payment, in store order then array order.
    pub async fn list_payments(&self) -> Result<Vec<PaymentView>> {
        let mut payments = Vec::new();
        for account in self.parent_accounts().await? {
            for (index, record) in account.records().enumerate() {
                match record {
                    Ok(record) => payments.extend(PaymentView::from_record(record)),
                    Err(e) => {
                        warn!(parent = %account.id, index, "Skipping malformed student entry: {}", e)
                    }
                }
            }
        }
        Ok(payments)
    }

    /// First record with this student id across all parents, paid or not.
    pub async fn find_student(&self, student_id: &str) -> Result<Option<StudentPaymentRecord>> {
        Ok(self
            .parent_accounts()
            .await?
            .iter()
            .find_map(|account| account.find_student(student_id)))
    }

    /// Moves the payment attempt `(student_id, transaction_id)` to `status`.
    ///
    /// Only the first parent document holding the attempt is rewritten. Every
    /// matching entry in it gets the new status and a fresh `updatedAt`; the
    /// other entries are written back unchanged.
    pub async fn set_payment_status(
        &self,
        student_id: &str,
        transaction_id: &str,
        status: PaymentStatus,
    ) -> Result<StatusChange> {
        if student_id.is_empty() || transaction_id.is_empty() {
            return Err(AdminError::Validation(
                "Student ID and Transaction ID are required".into(),
            ));
        }
        if status == PaymentStatus::Pending {
            return Err(AdminError::Validation(
                "A payment can only be approved or rejected".into(),
            ));
        }

        let mut account = self
            .parent_accounts()
            .await?
            .into_iter()
            .find(|account| {
                !account
                    .payment_statuses(student_id, transaction_id)
                    .is_empty()
            })
            .ok_or_else(|| AdminError::NotFound("Student not found".into()))?;

        for current in account.payment_statuses(student_id, transaction_id) {
            if !self.policy.permits(current, status) {
                return Err(AdminError::InvalidTransition {
                    from: current,
                    to: status,
                });
            }
        }

        let parent_id = account.id.clone();
        account.apply_status(student_id, transaction_id, status, &now_iso());
        self.store
            .write_document(PARENT_STUDENTS, &parent_id, account.students_update())
            .await
            .inspect_err(|e| {
                error!(parent = %parent_id, student = student_id, "Failed to record {}: {}", status, e)
            })?;

        let message = match status {
            PaymentStatus::Paid => {
                info!(student = student_id, tx = transaction_id, "Payment approved");
                "Payment approved successfully"
            }
            _ => {
                info!(student = student_id, tx = transaction_id, "Payment rejected");
                "Payment rejected successfully"
            }
        };

        Ok(StatusChange {
            success: true,
            message: message.to_string(),
        })
    }

    pub async fn approve_payment(
        &self,
        student_id: &str,
        transaction_id: &str,
    ) -> Result<StatusChange> {
        self.set_payment_status(student_id, transaction_id, PaymentStatus::Paid)
            .await
    }

    pub async fn reject_payment(
        &self,
        student_id: &str,
        transaction_id: &str,
    ) -> Result<StatusChange> {
        self.set_payment_status(student_id, transaction_id, PaymentStatus::Rejected)
            .await
    }
}
