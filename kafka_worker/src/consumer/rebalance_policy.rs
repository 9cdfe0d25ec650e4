use crate::error::WorkerError;
use rdkafka::consumer::{BaseConsumer, Consumer, ConsumerContext};
use rdkafka::error::{KafkaResult, RDKafkaErrorCode};
use rdkafka::types::RDKafkaRespErr;
use rdkafka::TopicPartitionList;
use tracing::info;

/// Takes ownership of a partition set on behalf of the rebalance policy.
pub trait PartitionAssigner {
    fn assign(&self, assignment: &TopicPartitionList) -> KafkaResult<()>;
}

impl<C: ConsumerContext + 'static> PartitionAssigner for BaseConsumer<C> {
    fn assign(&self, assignment: &TopicPartitionList) -> KafkaResult<()> {
        <Self as Consumer<C>>::assign(self, assignment)
    }
}

/// Reacts to group membership changes reported by the client.
///
/// Assignments are accepted as is, a revocation releases every partition and
/// any other notification is reported as [`WorkerError::Rebalance`].
#[derive(Debug, Default)]
pub struct RebalancePolicy;

impl RebalancePolicy {
    pub fn new() -> Self {
        Self
    }

    pub fn on_rebalance<A: PartitionAssigner + ?Sized>(
        &self,
        assigner: &A,
        err: RDKafkaRespErr,
        partitions: &TopicPartitionList,
    ) -> Result<(), WorkerError> {
        match err {
            RDKafkaRespErr::RD_KAFKA_RESP_ERR__ASSIGN_PARTITIONS => {
                info!(
                    "Assigned to partitions: {}",
                    describe_partitions(partitions)
                );
                assigner.assign(partitions)?;
            }
            RDKafkaRespErr::RD_KAFKA_RESP_ERR__REVOKE_PARTITIONS => {
                info!("Revoked from all partitions");
                assigner.assign(&TopicPartitionList::new())?;
            }
            other => {
                return Err(WorkerError::Rebalance(
                    RDKafkaErrorCode::from(other).to_string(),
                ))
            }
        }

        Ok(())
    }
}

fn describe_partitions(partitions: &TopicPartitionList) -> String {
    let described = partitions
        .elements()
        .iter()
        .map(|element| {
            format!(
                "{}/{}:{:?}",
                element.topic(),
                element.partition(),
                element.offset()
            )
        })
        .collect::<Vec<_>>();

    format!("[{}]", described.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdkafka::error::KafkaError;
    use rdkafka::Offset;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingAssigner {
        assigned_counts: Mutex<Vec<usize>>,
        fail: bool,
    }

    impl PartitionAssigner for RecordingAssigner {
        fn assign(&self, assignment: &TopicPartitionList) -> KafkaResult<()> {
            if self.fail {
                return Err(KafkaError::Subscription("assign failed".to_owned()));
            }
            self.assigned_counts.lock().unwrap().push(assignment.count());
            Ok(())
        }
    }

    fn partitions() -> TopicPartitionList {
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset("topic1", 0, Offset::Offset(5))
            .unwrap();
        tpl.add_partition_offset("topic2", 3, Offset::Beginning)
            .unwrap();
        tpl
    }

    #[test]
    fn assignment_is_accepted_as_given() {
        let assigner = RecordingAssigner::default();

        RebalancePolicy::new()
            .on_rebalance(
                &assigner,
                RDKafkaRespErr::RD_KAFKA_RESP_ERR__ASSIGN_PARTITIONS,
                &partitions(),
            )
            .unwrap();

        assert_eq!(*assigner.assigned_counts.lock().unwrap(), vec![2]);
    }

    #[test]
    fn revocation_releases_all_partitions() {
        let assigner = RecordingAssigner::default();

        RebalancePolicy::new()
            .on_rebalance(
                &assigner,
                RDKafkaRespErr::RD_KAFKA_RESP_ERR__REVOKE_PARTITIONS,
                &partitions(),
            )
            .unwrap();

        assert_eq!(*assigner.assigned_counts.lock().unwrap(), vec![0]);
    }

    #[test]
    fn unknown_notification_fails_without_assigning() {
        let assigner = RecordingAssigner::default();

        let result = RebalancePolicy::new().on_rebalance(
            &assigner,
            RDKafkaRespErr::RD_KAFKA_RESP_ERR_UNKNOWN_TOPIC_OR_PART,
            &partitions(),
        );

        assert!(matches!(result, Err(WorkerError::Rebalance(_))));
        assert!(assigner.assigned_counts.lock().unwrap().is_empty());
    }

    #[test]
    fn assign_failure_is_propagated() {
        let assigner = RecordingAssigner {
            fail: true,
            ..Default::default()
        };

        let result = RebalancePolicy::new().on_rebalance(
            &assigner,
            RDKafkaRespErr::RD_KAFKA_RESP_ERR__ASSIGN_PARTITIONS,
            &partitions(),
        );

        assert!(matches!(result, Err(WorkerError::Kafka(_))));
    }

    #[test]
    fn partitions_are_described_with_offsets() {
        assert_eq!(
            describe_partitions(&partitions()),
            "[topic1/0:Offset(5), topic2/3:Beginning]"
        );
    }
}
