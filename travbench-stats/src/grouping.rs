//! Result Grouping
//!
//! Records that carry a template are relabelled before grouping: the
//! template becomes the visible name and the original name moves to
//! `sequence`. Relabelling works on copies, so grouping the same input twice
//! gives the same answer.

use fxhash::FxHashMap;
use travbench_core::ResultRecord;

/// Records sharing one group key, in input order
#[derive(Debug, Clone, PartialEq)]
pub struct ResultGroup {
    /// Group key (query-set name, or template name)
    pub name: String,
    /// Relabelled copies of the member records
    pub members: Vec<ResultRecord>,
}

/// Group records by name, relabelling templated records to their template.
///
/// Groups come out in the order their key was first seen.
pub fn group_results(records: &[ResultRecord]) -> Vec<ResultGroup> {
    let mut groups: Vec<ResultGroup> = Vec::new();
    let mut index: FxHashMap<String, usize> = FxHashMap::default();

    for record in records {
        let member = relabel(record);
        match index.get(&member.name) {
            Some(&pos) => groups[pos].members.push(member),
            None => {
                index.insert(member.name.clone(), groups.len());
                groups.push(ResultGroup {
                    name: member.name.clone(),
                    members: vec![member],
                });
            }
        }
    }

    groups
}

fn relabel(record: &ResultRecord) -> ResultRecord {
    let mut copy = record.clone();
    if let Some(template) = &record.template {
        copy.sequence = Some(record.name.clone());
        copy.name = template.clone();
    }
    copy
}
