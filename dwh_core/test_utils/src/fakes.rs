use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::config::components::connections::ConnectionDetails;
use common::types::{ClusterDetails, ClusterStatus, RoleDetails};
use shared_clients::aws::{
    ControlPlaneError, CreateClusterRequest, CreateRoleRequest, IamControlPlane,
    RedshiftControlPlane,
};
use shared_clients::{
    AdapterFactory, AsyncDatabaseAdapter, AsyncDbAdapter, DatabaseAdapterError,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const FAKE_ACCOUNT_ID: &str = "123456789012";

fn fixed_time() -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(1_700_000_000, 0)
}

// ---------------- IAM ----------------

#[derive(Default)]
struct FakeIamState {
    roles: HashMap<String, RoleDetails>,
    create_requests: Vec<CreateRoleRequest>,
    attached: Vec<(String, String)>,
    reject_create: Option<String>,
}

/// In-memory IAM that assigns ARNs the way the real service formats them.
#[derive(Default)]
pub struct FakeIam {
    state: Mutex<FakeIamState>,
}

impl FakeIam {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_role(name: &str) -> Self {
        let fake = Self::default();
        let details = Self::details_for(name, "pre-existing role");
        fake.state
            .lock()
            .unwrap()
            .roles
            .insert(name.to_string(), details);
        fake
    }

    pub fn rejecting_create(message: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().reject_create = Some(message.to_string());
        fake
    }

    pub fn arn_for(name: &str) -> String {
        format!("arn:aws:iam::{FAKE_ACCOUNT_ID}:role/{name}")
    }

    fn details_for(name: &str, description: &str) -> RoleDetails {
        RoleDetails {
            name: name.to_string(),
            role_id: format!("AROA{}", name.to_uppercase()),
            arn: Self::arn_for(name),
            created: fixed_time(),
            description: Some(description.to_string()),
        }
    }

    pub fn create_requests(&self) -> Vec<CreateRoleRequest> {
        self.state.lock().unwrap().create_requests.clone()
    }

    pub fn attached_policies(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().attached.clone()
    }
}

#[async_trait]
impl IamControlPlane for FakeIam {
    async fn get_role(&self, role_name: &str) -> Result<RoleDetails, ControlPlaneError> {
        self.state
            .lock()
            .unwrap()
            .roles
            .get(role_name)
            .cloned()
            .ok_or_else(|| ControlPlaneError::not_found(format!("role '{role_name}'")))
    }

    async fn create_role(
        &self,
        request: &CreateRoleRequest,
    ) -> Result<RoleDetails, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.create_requests.push(request.clone());
        if let Some(message) = &state.reject_create {
            return Err(ControlPlaneError::rejected(message.clone()));
        }
        if state.roles.contains_key(&request.role_name) {
            return Err(ControlPlaneError::rejected(format!(
                "EntityAlreadyExists: role '{}'",
                request.role_name
            )));
        }
        let details = Self::details_for(&request.role_name, &request.description);
        state
            .roles
            .insert(request.role_name.clone(), details.clone());
        Ok(details)
    }

    async fn attach_role_policy(
        &self,
        role_name: &str,
        policy_arn: &str,
    ) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        if !state.roles.contains_key(role_name) {
            return Err(ControlPlaneError::not_found(format!("role '{role_name}'")));
        }
        state
            .attached
            .push((role_name.to_string(), policy_arn.to_string()));
        Ok(())
    }
}

// ---------------- Redshift ----------------

#[derive(Default)]
struct FakeRedshiftState {
    cluster: Option<ClusterDetails>,
    scripted: VecDeque<ClusterStatus>,
    describe_calls: usize,
    create_requests: Vec<CreateClusterRequest>,
    reject_create: Option<String>,
}

/// In-memory Redshift whose reported status follows a script.
///
/// Every `describe_cluster` on an existing cluster consumes the next scripted
/// status; once the script runs dry the last status sticks. Reaching
/// `available` fills in the endpoint and creation time, as the real service
/// does.
#[derive(Default)]
pub struct FakeRedshift {
    state: Mutex<FakeRedshiftState>,
}

impl FakeRedshift {
    pub fn absent() -> Self {
        Self::default()
    }

    pub fn with_cluster(identifier: &str, status: ClusterStatus) -> Self {
        let fake = Self::default();
        let mut details = Self::fresh_details(identifier);
        Self::apply_status(&mut details, status);
        fake.state.lock().unwrap().cluster = Some(details);
        fake
    }

    pub fn rejecting_create(message: &str) -> Self {
        let fake = Self::default();
        fake.state.lock().unwrap().reject_create = Some(message.to_string());
        fake
    }

    /// Statuses reported by subsequent `describe_cluster` calls, in order.
    pub fn then_report(self, statuses: impl IntoIterator<Item = ClusterStatus>) -> Self {
        self.state.lock().unwrap().scripted.extend(statuses);
        self
    }

    pub fn endpoint_for(identifier: &str) -> String {
        format!("{identifier}.abc123xyz.us-west-2.redshift.amazonaws.com")
    }

    pub fn describe_calls(&self) -> usize {
        self.state.lock().unwrap().describe_calls
    }

    pub fn create_requests(&self) -> Vec<CreateClusterRequest> {
        self.state.lock().unwrap().create_requests.clone()
    }

    fn fresh_details(identifier: &str) -> ClusterDetails {
        ClusterDetails {
            identifier: identifier.to_string(),
            status: ClusterStatus::Creating,
            db_name: Some("dwh".to_string()),
            master_username: Some("dwhuser".to_string()),
            endpoint: None,
            port: None,
            created: None,
            availability_zone: Some("us-west-2b".to_string()),
        }
    }

    fn apply_status(details: &mut ClusterDetails, status: ClusterStatus) {
        if status.is_available() && details.endpoint.is_none() {
            details.endpoint = Some(Self::endpoint_for(&details.identifier));
            details.port = Some(5439);
            details.created = fixed_time();
        }
        details.status = status;
    }
}

#[async_trait]
impl RedshiftControlPlane for FakeRedshift {
    async fn describe_cluster(
        &self,
        identifier: &str,
    ) -> Result<ClusterDetails, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;

        let known = matches!(&state.cluster, Some(cluster) if cluster.identifier == identifier);
        if !known {
            return Err(ControlPlaneError::not_found(format!(
                "cluster '{identifier}'"
            )));
        }

        let next = state.scripted.pop_front();
        match state.cluster.as_mut() {
            Some(cluster) => {
                if let Some(status) = next {
                    Self::apply_status(cluster, status);
                }
                Ok(cluster.clone())
            }
            None => Err(ControlPlaneError::not_found(format!(
                "cluster '{identifier}'"
            ))),
        }
    }

    async fn create_cluster(
        &self,
        request: &CreateClusterRequest,
    ) -> Result<ClusterDetails, ControlPlaneError> {
        let mut state = self.state.lock().unwrap();
        state.create_requests.push(request.clone());
        if let Some(message) = &state.reject_create {
            return Err(ControlPlaneError::rejected(message.clone()));
        }
        if state.cluster.is_some() {
            return Err(ControlPlaneError::rejected(format!(
                "ClusterAlreadyExists: '{}'",
                request.cluster_identifier
            )));
        }
        let details = Self::fresh_details(&request.cluster_identifier);
        state.cluster = Some(details.clone());
        Ok(details)
    }
}

// ---------------- Warehouse ----------------

/// Adapter that records every statement instead of running it.
/// Called with every statement after it is recorded.
pub type StatementHook = Arc<dyn Fn(&str) + Send + Sync>;

pub struct RecordingAdapter {
    log: Arc<Mutex<Vec<String>>>,
    fail_on: Option<String>,
    on_execute: Option<StatementHook>,
}

impl RecordingAdapter {
    pub fn new() -> Self {
        Self {
            log: Arc::new(Mutex::new(Vec::new())),
            fail_on: None,
            on_execute: None,
        }
    }

    /// Fail the first statement containing `needle`, after recording it.
    pub fn failing_on(needle: &str) -> Self {
        Self {
            fail_on: Some(needle.to_string()),
            ..Self::new()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn shared(log: Arc<Mutex<Vec<String>>>, on_execute: Option<StatementHook>) -> Self {
        Self {
            log,
            fail_on: None,
            on_execute,
        }
    }
}

impl Default for RecordingAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsyncDatabaseAdapter for RecordingAdapter {
    type Row = tokio_postgres::Row;

    async fn execute(&mut self, sql: &str) -> Result<(), DatabaseAdapterError> {
        self.log.lock().unwrap().push(sql.to_string());
        if let Some(hook) = &self.on_execute {
            hook(sql);
        }
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => Err(
                DatabaseAdapterError::unexpected(format!("injected failure on '{needle}'")),
            ),
            _ => Ok(()),
        }
    }

    async fn query(&self, _sql: &str) -> Result<Vec<Self::Row>, DatabaseAdapterError> {
        Ok(Vec::new())
    }
}

/// Hands out [`RecordingAdapter`]s that all append to one shared log.
#[derive(Clone, Default)]
pub struct RecordingAdapterFactory {
    log: Arc<Mutex<Vec<String>>>,
    connections: Arc<Mutex<Vec<ConnectionDetails>>>,
    on_execute: Option<StatementHook>,
}

impl RecordingAdapterFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(hook: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            on_execute: Some(Arc::new(hook)),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn connections(&self) -> Vec<ConnectionDetails> {
        self.connections.lock().unwrap().clone()
    }
}

#[async_trait]
impl AdapterFactory for RecordingAdapterFactory {
    async fn connect(
        &self,
        conn_details: &ConnectionDetails,
    ) -> Result<AsyncDbAdapter, DatabaseAdapterError> {
        self.connections.lock().unwrap().push(conn_details.clone());
        Ok(Box::new(RecordingAdapter::shared(
            self.log.clone(),
            self.on_execute.clone(),
        )))
    }
}
