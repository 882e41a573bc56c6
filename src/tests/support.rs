//! In-memory account used by unit tests in place of the Lambda API.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use inspector_suppressor_core::{
    FunctionDescriptor, FunctionInventory, FunctionPage, InventoryError, TagError, TagSet,
    TagStore,
};
use tokio::sync::Barrier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagCall {
    Read(String),
    Remove(String, Vec<String>),
    Add(String, TagSet),
}

pub fn arn(name: &str) -> String {
    format!("arn:aws:lambda:eu-west-1:123456789012:function:{name}")
}

pub fn tags(pairs: &[(&str, &str)]) -> TagSet {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

pub struct FakeAccount {
    functions: Vec<FunctionDescriptor>,
    page_size: usize,
    failing_page: Option<usize>,
    failing_reads: HashSet<String>,
    failing_removes: HashSet<String>,
    failing_adds: HashSet<String>,
    panicking_reads: HashSet<String>,
    read_barrier: Option<Arc<Barrier>>,
    tags: Mutex<BTreeMap<String, TagSet>>,
    calls: Mutex<Vec<TagCall>>,
    list_calls: Mutex<Vec<Option<String>>>,
}

impl FakeAccount {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
            page_size: 50,
            failing_page: None,
            failing_reads: HashSet::new(),
            failing_removes: HashSet::new(),
            failing_adds: HashSet::new(),
            panicking_reads: HashSet::new(),
            read_barrier: None,
            tags: Mutex::new(BTreeMap::new()),
            calls: Mutex::new(Vec::new()),
            list_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_function(mut self, name: &str, initial: &[(&str, &str)]) -> Self {
        let function_arn = arn(name);
        self.functions.push(FunctionDescriptor {
            function_name: name.to_string(),
            function_arn: function_arn.clone(),
        });
        self.tags
            .get_mut()
            .expect("tags lock")
            .insert(function_arn, tags(initial));
        self
    }

    pub fn with_functions(mut self, count: usize) -> Self {
        for index in 0..count {
            self = self.with_function(&format!("fn-{index:03}"), &[]);
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn failing_page(mut self, index: usize) -> Self {
        self.failing_page = Some(index);
        self
    }

    pub fn failing_read(mut self, name: &str) -> Self {
        self.failing_reads.insert(arn(name));
        self
    }

    pub fn failing_remove(mut self, name: &str) -> Self {
        self.failing_removes.insert(arn(name));
        self
    }

    pub fn failing_add(mut self, name: &str) -> Self {
        self.failing_adds.insert(arn(name));
        self
    }

    pub fn panicking_read(mut self, name: &str) -> Self {
        self.panicking_reads.insert(arn(name));
        self
    }

    /// Every read waits until `parties` reads are in flight at once.
    pub fn with_read_barrier(mut self, parties: usize) -> Self {
        self.read_barrier = Some(Arc::new(Barrier::new(parties)));
        self
    }

    pub fn tags_of(&self, name: &str) -> TagSet {
        self.tags
            .lock()
            .expect("tags lock")
            .get(&arn(name))
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<TagCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn calls_for(&self, name: &str) -> Vec<TagCall> {
        let function_arn = arn(name);
        self.calls()
            .into_iter()
            .filter(|call| match call {
                TagCall::Read(resource)
                | TagCall::Remove(resource, _)
                | TagCall::Add(resource, _) => resource == &function_arn,
            })
            .collect()
    }

    pub fn write_calls(&self) -> Vec<TagCall> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, TagCall::Read(_)))
            .collect()
    }

    pub fn list_calls(&self) -> Vec<Option<String>> {
        self.list_calls.lock().expect("list lock").clone()
    }

    fn record(&self, call: TagCall) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

#[async_trait]
impl FunctionInventory for FakeAccount {
    async fn list_functions(&self, marker: Option<&str>) -> Result<FunctionPage, InventoryError> {
        self.list_calls
            .lock()
            .expect("list lock")
            .push(marker.map(ToOwned::to_owned));

        let page_index = match marker {
            None => 0,
            Some(raw) => raw
                .strip_prefix("page-")
                .and_then(|index| index.parse::<usize>().ok())
                .ok_or_else(|| InventoryError::InvalidResponse {
                    message: format!("unknown marker {raw}"),
                })?,
        };

        if self.failing_page == Some(page_index) {
            return Err(InventoryError::Transport {
                message: "ThrottlingException: Rate exceeded".to_string(),
            });
        }

        let start = page_index * self.page_size;
        let end = (start + self.page_size).min(self.functions.len());
        let functions = self.functions.get(start..end).unwrap_or_default().to_vec();
        let next_marker = (end < self.functions.len()).then(|| format!("page-{}", page_index + 1));

        Ok(FunctionPage {
            functions,
            next_marker,
        })
    }
}

#[async_trait]
impl TagStore for FakeAccount {
    async fn read_tags(&self, resource: &str) -> Result<TagSet, TagError> {
        self.record(TagCall::Read(resource.to_string()));

        if let Some(barrier) = &self.read_barrier {
            barrier.wait().await;
        }
        if self.panicking_reads.contains(resource) {
            panic!("tag client crashed for {resource}");
        }
        if self.failing_reads.contains(resource) {
            return Err(TagError::Read {
                resource: resource.to_string(),
                message: "AccessDeniedException: not authorized".to_string(),
            });
        }

        Ok(self
            .tags
            .lock()
            .expect("tags lock")
            .get(resource)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_tags(&self, resource: &str, keys: &[String]) -> Result<(), TagError> {
        self.record(TagCall::Remove(resource.to_string(), keys.to_vec()));

        if self.failing_removes.contains(resource) {
            return Err(TagError::Remove {
                resource: resource.to_string(),
                message: "ResourceConflictException: update in progress".to_string(),
            });
        }

        let mut all_tags = self.tags.lock().expect("tags lock");
        let current = all_tags.entry(resource.to_string()).or_default();
        for key in keys {
            current.remove(key);
        }
        Ok(())
    }

    async fn add_tags(&self, resource: &str, tags: &TagSet) -> Result<(), TagError> {
        self.record(TagCall::Add(resource.to_string(), tags.clone()));

        if self.failing_adds.contains(resource) {
            return Err(TagError::Add {
                resource: resource.to_string(),
                message: "ResourceConflictException: update in progress".to_string(),
            });
        }

        let mut all_tags = self.tags.lock().expect("tags lock");
        let current = all_tags.entry(resource.to_string()).or_default();
        current.extend(tags.iter().map(|(key, value)| (key.clone(), value.clone())));
        Ok(())
    }
}
