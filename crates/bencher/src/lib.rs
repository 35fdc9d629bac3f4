use serde_json::{Value, json};

#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    group: TestGroup,
}

impl TestCase {
    pub fn new(name: &'static str, group: TestGroup) -> Self {
        Self { name, group }
    }

    pub fn small(name: &'static str) -> Self {
        Self::new(name, TestGroup::Small)
    }

    pub fn normal(name: &'static str) -> Self {
        Self::new(name, TestGroup::Normal)
    }

    pub fn large(name: &'static str) -> Self {
        Self::new(name, TestGroup::Large)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn group(&self) -> TestGroup {
        self.group
    }

    /// the argument list a call of this case receives
    pub fn args(&self) -> Vec<Value> {
        (0..self.group.arg_count()).map(|i| json!(i)).collect()
    }

    /// one leading array argument holding [`TestCase::args`]
    pub fn array_arg(&self) -> Vec<Value> {
        vec![Value::Array(self.args())]
    }
}

#[derive(Clone, Copy, Debug)]
pub enum TestGroup {
    Small,
    Normal,
    Large,
}

impl TestGroup {
    pub fn arg_count(self) -> usize {
        match self {
            TestGroup::Small => 1,
            TestGroup::Normal => 8,
            TestGroup::Large => 256,
        }
    }
}
