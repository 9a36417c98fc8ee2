//! # Registro y login de usuarios
//! src/handlers/users.rs
//!
//! - `POST /api/register`: `{"username": "...", "password": "..."}`
//! - `POST /api/login`: mismo body; responde con un token si coincide
//!
//! Los usuarios viven en memoria (`DashMap`). El registro usa la API de
//! `entry`, así que dos registros simultáneos del mismo nombre nunca tienen
//! éxito los dos. Las contraseñas se guardan como SHA-256.

use crate::http::{Request, Response, StatusCode};
use crate::router::HandlerResult;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Deserialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use std::time::SystemTime;
use tracing::info;
use uuid::Uuid;

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 20;
const PASSWORD_MIN: usize = 6;

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    password_hash: String,
    pub created_at: SystemTime,
}

impl User {
    fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password_hash: hash_password(password),
            created_at: SystemTime::now(),
        }
    }

    fn password_matches(&self, password: &str) -> bool {
        self.password_hash == hash_password(password)
    }
}

fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Registro de usuarios compartido entre conexiones
#[derive(Debug, Default)]
pub struct UserStore {
    users: DashMap<String, User>,
}

impl UserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` si se creó; `false` si el nombre ya existe o algún campo está vacío
    ///
    /// # Ejemplo
    /// ```
    /// use socket_http::handlers::UserStore;
    ///
    /// let store = UserStore::new();
    /// assert!(store.register("ana", "secreto"));
    /// assert!(!store.register("ana", "otra-clave"));
    /// assert!(store.login("ana", "secreto"));
    /// ```
    pub fn register(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }

        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(User::new(username, password));
                true
            }
        }
    }

    pub fn login(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .map(|user| user.password_matches(password))
            .unwrap_or(false)
    }

    pub fn exists(&self, username: &str) -> bool {
        self.users.contains_key(username)
    }

    pub fn get(&self, username: &str) -> Option<User> {
        self.users.get(username).map(|u| u.clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn clear(&self) {
        self.users.clear();
    }
}

/// Body de register/login; campos ausentes o de otro tipo quedan en `None`
#[derive(Debug, Default, Deserialize)]
struct Credentials {
    #[serde(default, deserialize_with = "lenient_string")]
    username: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    password: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_str().map(str::to_string))
}

impl Credentials {
    /// Valida el body y retorna `(username, password)` o la respuesta 400
    fn from_request(request: &Request) -> Result<(String, String), Response> {
        let body = request.body_string().unwrap_or_default();
        if body.trim().is_empty() {
            return Err(Response::bad_request("Request body must not be empty"));
        }

        let credentials: Credentials = serde_json::from_str(&body).unwrap_or_default();

        let username = credentials
            .username
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .ok_or_else(|| Response::bad_request("Username is required"))?;

        let password = credentials
            .password
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| Response::bad_request("Password is required"))?;

        Ok((username, password))
    }
}

/// `POST /api/register`
pub fn register_handler(store: &UserStore, request: &Request) -> HandlerResult {
    let (username, password) = match Credentials::from_request(request) {
        Ok(c) => c,
        Err(response) => return Ok(response),
    };

    let length = username.chars().count();
    if !(USERNAME_MIN..=USERNAME_MAX).contains(&length) {
        return Ok(Response::bad_request(&format!(
            "Username must be between {} and {} characters",
            USERNAME_MIN, USERNAME_MAX
        )));
    }
    if password.chars().count() < PASSWORD_MIN {
        return Ok(Response::bad_request(&format!(
            "Password must be at least {} characters",
            PASSWORD_MIN
        )));
    }

    if store.register(&username, &password) {
        info!("Registered user '{}'", username);
        let body = json!({ "code": 200, "message": "Registration successful" });
        Ok(Response::json(&body.to_string()))
    } else {
        Ok(Response::error(StatusCode::BadRequest, "Username already exists"))
    }
}

/// `POST /api/login`
pub fn login_handler(store: &UserStore, request: &Request) -> HandlerResult {
    let (username, password) = match Credentials::from_request(request) {
        Ok(c) => c,
        Err(response) => return Ok(response),
    };

    if store.login(&username, &password) {
        let token = Uuid::new_v4().simple().to_string();
        let body = json!({ "code": 200, "message": "Login successful", "token": token });
        Ok(Response::json(&body.to_string()))
    } else {
        Ok(Response::error(StatusCode::Unauthorized, "Invalid username or password"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use std::sync::Arc;
    use std::thread;

    fn post(body: &str) -> Request {
        Request::new(Method::POST, "/api/register")
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    fn body_json(response: &Response) -> serde_json::Value {
        serde_json::from_str(&response.body_string().unwrap()).unwrap()
    }

    #[test]
    fn test_register_and_login() {
        let store = UserStore::new();

        let response = register_handler(&store, &post(r#"{"username":"alice","password":"secret1"}"#)).unwrap();
        assert_eq!(response.status_code(), 200);
        assert!(store.exists("alice"));

        let response = login_handler(&store, &post(r#"{"username":"alice","password":"secret1"}"#)).unwrap();
        assert_eq!(response.status_code(), 200);
        let token = body_json(&response)["token"].as_str().unwrap().to_string();
        assert_eq!(token.len(), 32);

        let response = login_handler(&store, &post(r#"{"username":"alice","password":"wrong!!"}"#)).unwrap();
        assert_eq!(response.status_code(), 401);
    }

    #[test]
    fn test_duplicate_registration() {
        let store = UserStore::new();
        let request = post(r#"{"username":"bob","password":"123456"}"#);

        assert_eq!(register_handler(&store, &request).unwrap().status_code(), 200);
        let response = register_handler(&store, &request).unwrap();
        assert_eq!(response.status_code(), 400);
        assert_eq!(body_json(&response)["message"], "Username already exists");
    }

    #[test]
    fn test_validation() {
        let store = UserStore::new();
        let cases = [
            ("", "Request body must not be empty"),
            ("not json", "Username is required"),
            (r#"{"password":"123456"}"#, "Username is required"),
            (r#"{"username":"bob"}"#, "Password is required"),
            (r#"{"username":42,"password":"123456"}"#, "Username is required"),
            (r#"{"username":"ab","password":"123456"}"#, "Username must be between 3 and 20 characters"),
            (r#"{"username":"bob","password":"12345"}"#, "Password must be at least 6 characters"),
        ];

        for (body, message) in cases {
            let response = register_handler(&store, &post(body)).unwrap();
            assert_eq!(response.status_code(), 400, "body: {}", body);
            assert_eq!(body_json(&response)["message"], message, "body: {}", body);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_username_is_trimmed() {
        let store = UserStore::new();
        register_handler(&store, &post(r#"{"username":"  carol ","password":"123456"}"#)).unwrap();
        assert!(store.exists("carol"));
        assert!(store.login("carol", "123456"));
    }

    #[test]
    fn test_password_not_stored_in_clear() {
        let store = UserStore::new();
        store.register("dave", "hunter22");
        let user = store.get("dave").unwrap();
        assert_ne!(user.password_hash, "hunter22");
        assert_eq!(user.password_hash.len(), 64);
    }

    #[test]
    fn test_concurrent_registration_single_winner() {
        let store = Arc::new(UserStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.register("race", &format!("password{}", i)))
            })
            .collect();

        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(store.len(), 1);
    }
}
