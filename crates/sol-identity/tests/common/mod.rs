//! Shared test fixtures: an in-memory Management API with call recording
//! and per-operation failure injection.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use sol_identity::mgmt::{
    ManagementApi, ManagementPage, ManagementRole, ManagementUser, NewUser, PasswordTicketRequest,
    ResourceScope, RolePermission, RoleUpdate,
};
use sol_identity::{IdentityError, Result};

pub const TICKET_URL: &str = "https://solara.eu.auth0.com/tickets/password-change/abc123";

/// In-memory stand-in for the provider. Records every call in order and
/// can be told to fail specific operations.
#[derive(Default)]
pub struct MockManagement {
    state: Mutex<MockState>,
    calls: Mutex<Vec<String>>,
    /// Remaining failures per operation; `u32::MAX` means always fail
    fail_ops: Mutex<HashMap<String, u32>>,
}

#[derive(Default)]
struct MockState {
    users: Vec<ManagementUser>,
    user_roles: HashMap<String, Vec<String>>,
    roles: Vec<ManagementRole>,
    role_permissions: HashMap<String, Vec<RolePermission>>,
    scopes: Vec<ResourceScope>,
    next_id: u32,
}

impl MockManagement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the named operation always fail with an injected provider error.
    pub fn fail_on(&self, operation: &str) {
        self.fail_ops
            .lock()
            .unwrap()
            .insert(operation.to_string(), u32::MAX);
    }

    /// Makes only the next call to the named operation fail.
    pub fn fail_once(&self, operation: &str) {
        self.fail_ops
            .lock()
            .unwrap()
            .insert(operation.to_string(), 1);
    }

    pub fn seed_user(&self, id: &str, name: Option<&str>, role_ids: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.users.push(ManagementUser {
            id: id.to_string(),
            email: Some(format!("{id}@example.com")),
            name: name.map(str::to_string),
            picture: None,
            last_login: None,
        });
        state
            .user_roles
            .insert(id.to_string(), role_ids.iter().map(|r| r.to_string()).collect());
    }

    pub fn seed_role(&self, id: &str, name: &str, permissions: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.roles.push(ManagementRole {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
        });
        state.role_permissions.insert(
            id.to_string(),
            permissions
                .iter()
                .map(|p| RolePermission {
                    name: p.to_string(),
                    resource_server_identifier: "https://api.solara.dev".to_string(),
                })
                .collect(),
        );
    }

    pub fn set_scopes(&self, values: &[&str]) {
        let mut state = self.state.lock().unwrap();
        state.scopes = values
            .iter()
            .map(|v| ResourceScope {
                value: v.to_string(),
                description: None,
            })
            .collect();
    }

    /// Recorded calls, in order, as `op(arg, ...)` strings.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(&format!("{operation}(")))
            .count()
    }

    pub fn user_roles(&self, user_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .user_roles
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn user_exists(&self, user_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .any(|u| u.id == user_id)
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_failure(&self, operation: &str) -> Result<()> {
        let mut fail_ops = self.fail_ops.lock().unwrap();
        match fail_ops.get_mut(operation) {
            Some(0) | None => Ok(()),
            Some(remaining) => {
                if *remaining != u32::MAX {
                    *remaining -= 1;
                }
                Err(IdentityError::management(
                    operation,
                    Some(500),
                    "injected failure",
                ))
            }
        }
    }

    fn page<T: Clone>(items: &[T], page: u32, size: u32) -> ManagementPage<T> {
        let start = (page * size) as usize;
        let slice = items
            .iter()
            .skip(start)
            .take(size as usize)
            .cloned()
            .collect();
        ManagementPage {
            items: slice,
            start: Some(page * size),
            limit: Some(size),
            total: items.len() as u64,
        }
    }
}

#[async_trait]
impl ManagementApi for MockManagement {
    async fn create_user(&self, new_user: &NewUser) -> Result<ManagementUser> {
        self.record(format!("create_user({})", new_user.email));
        self.check_failure("create_user")?;

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let user = ManagementUser {
            id: format!("auth0|u{}", state.next_id),
            email: Some(new_user.email.clone()),
            name: None,
            picture: None,
            last_login: None,
        };
        state.users.push(user.clone());
        state.user_roles.insert(user.id.clone(), Vec::new());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<ManagementUser> {
        self.record(format!("get_user({user_id})"));
        self.check_failure("get_user")?;

        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| IdentityError::not_found("User", user_id))
    }

    async fn list_users(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementUser>> {
        self.record(format!("list_users({page}, {size})"));
        self.check_failure("list_users")?;

        let state = self.state.lock().unwrap();
        Ok(Self::page(&state.users, page, size))
    }

    async fn delete_user(&self, user_id: &str) -> Result<()> {
        self.record(format!("delete_user({user_id})"));
        self.check_failure("delete_user")?;

        let mut state = self.state.lock().unwrap();
        state.users.retain(|u| u.id != user_id);
        state.user_roles.remove(user_id);
        Ok(())
    }

    async fn list_user_roles(&self, user_id: &str) -> Result<Vec<ManagementRole>> {
        self.record(format!("list_user_roles({user_id})"));
        self.check_failure("list_user_roles")?;

        let state = self.state.lock().unwrap();
        let role_ids = state.user_roles.get(user_id).cloned().unwrap_or_default();
        Ok(role_ids
            .into_iter()
            .map(|id| {
                state
                    .roles
                    .iter()
                    .find(|r| r.id == id)
                    .cloned()
                    .unwrap_or(ManagementRole {
                        name: id.clone(),
                        id,
                        description: None,
                    })
            })
            .collect())
    }

    async fn add_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()> {
        self.record(format!("add_user_roles({user_id}, {role_ids:?})"));
        self.check_failure("add_user_roles")?;

        let mut state = self.state.lock().unwrap();
        let assigned = state.user_roles.entry(user_id.to_string()).or_default();
        for id in role_ids {
            if !assigned.contains(id) {
                assigned.push(id.clone());
            }
        }
        Ok(())
    }

    async fn remove_user_roles(&self, user_id: &str, role_ids: &[String]) -> Result<()> {
        self.record(format!("remove_user_roles({user_id}, {role_ids:?})"));
        self.check_failure("remove_user_roles")?;

        let mut state = self.state.lock().unwrap();
        if let Some(assigned) = state.user_roles.get_mut(user_id) {
            assigned.retain(|id| !role_ids.contains(id));
        }
        Ok(())
    }

    async fn create_role(&self, name: &str, description: &str) -> Result<ManagementRole> {
        self.record(format!("create_role({name})"));
        self.check_failure("create_role")?;

        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let role = ManagementRole {
            id: format!("rol_{}", state.next_id),
            name: name.to_string(),
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
        };
        state.roles.push(role.clone());
        state.role_permissions.insert(role.id.clone(), Vec::new());
        Ok(role)
    }

    async fn get_role(&self, role_id: &str) -> Result<ManagementRole> {
        self.record(format!("get_role({role_id})"));
        self.check_failure("get_role")?;

        self.state
            .lock()
            .unwrap()
            .roles
            .iter()
            .find(|r| r.id == role_id)
            .cloned()
            .ok_or_else(|| IdentityError::not_found("Role", role_id))
    }

    async fn list_roles(&self, page: u32, size: u32) -> Result<ManagementPage<ManagementRole>> {
        self.record(format!("list_roles({page}, {size})"));
        self.check_failure("list_roles")?;

        let state = self.state.lock().unwrap();
        Ok(Self::page(&state.roles, page, size))
    }

    async fn update_role(&self, role_id: &str, update: &RoleUpdate) -> Result<ManagementRole> {
        self.record(format!(
            "update_role({role_id}, name={:?}, description={:?})",
            update.name, update.description
        ));
        self.check_failure("update_role")?;

        let mut state = self.state.lock().unwrap();
        let role = state
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| IdentityError::not_found("Role", role_id))?;
        if let Some(ref name) = update.name {
            role.name = name.clone();
        }
        if let Some(ref description) = update.description {
            role.description = Some(description.clone());
        }
        Ok(role.clone())
    }

    async fn delete_role(&self, role_id: &str) -> Result<()> {
        self.record(format!("delete_role({role_id})"));
        self.check_failure("delete_role")?;

        let mut state = self.state.lock().unwrap();
        state.roles.retain(|r| r.id != role_id);
        state.role_permissions.remove(role_id);
        Ok(())
    }

    async fn list_role_permissions(&self, role_id: &str) -> Result<Vec<RolePermission>> {
        self.record(format!("list_role_permissions({role_id})"));
        self.check_failure("list_role_permissions")?;

        Ok(self
            .state
            .lock()
            .unwrap()
            .role_permissions
            .get(role_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_role_permissions(
        &self,
        role_id: &str,
        permissions: &[RolePermission],
    ) -> Result<()> {
        let names: Vec<&str> = permissions.iter().map(|p| p.name.as_str()).collect();
        self.record(format!("add_role_permissions({role_id}, {names:?})"));
        self.check_failure("add_role_permissions")?;

        let mut state = self.state.lock().unwrap();
        let assigned = state
            .role_permissions
            .entry(role_id.to_string())
            .or_default();
        for permission in permissions {
            if !assigned.contains(permission) {
                assigned.push(permission.clone());
            }
        }
        Ok(())
    }

    async fn get_resource_server_scopes(&self, identifier: &str) -> Result<Vec<ResourceScope>> {
        self.record(format!("get_resource_server_scopes({identifier})"));
        self.check_failure("get_resource_server_scopes")?;

        Ok(self.state.lock().unwrap().scopes.clone())
    }

    async fn create_password_change_ticket(
        &self,
        request: &PasswordTicketRequest,
    ) -> Result<String> {
        self.record(format!(
            "create_password_change_ticket({})",
            request.user_id
        ));
        self.check_failure("create_password_change_ticket")?;

        Ok(TICKET_URL.to_string())
    }
}
