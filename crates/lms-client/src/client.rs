//! HTTP client for the gateway REST API.
//!
//! Every call goes through [`LmsClient::send`], which attaches the stored
//! bearer token and turns failure envelopes into [`ClientError::Api`].

use lms_core::{Envelope, PageRequest, Pagination, Role};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::credentials::{CredentialStore, Credentials, MemoryCredentials};
use crate::error::{ClientError, Result};
use crate::types::{Course, EnrollRequest, Enrollment, LoginRequest, LoginResponse, UserProfile};

/// A file attached to a form upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Form field name, usually `file`.
    pub field: String,
    /// Original file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

/// Client for the gateway REST API.
#[derive(Debug)]
pub struct LmsClient<C: CredentialStore = MemoryCredentials> {
    http: Client,
    base_url: String,
    credentials: C,
}

impl LmsClient<MemoryCredentials> {
    /// Create a client that keeps its session in memory.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the gateway (e.g., "http://localhost:5000")
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_credentials(base_url, MemoryCredentials::new())
    }
}

impl<C: CredentialStore> LmsClient<C> {
    /// Create a client backed by the given credential storage.
    pub fn with_credentials(base_url: impl Into<String>, credentials: C) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
        }
    }

    /// Get the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The credential storage.
    pub const fn credentials(&self) -> &C {
        &self.credentials
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.credentials.load()? {
            Some(stored) => builder.bearer_auth(stored.token),
            None => builder,
        })
    }

    /// Send a JSON request and return the success envelope.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for a non-2xx status or a `success: false`
    /// body, and `ClientError::Http` if the request could not be sent.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Envelope<Value>> {
        let mut builder = self
            .http
            .request(method.clone(), self.url(path))
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %method, path = %path, "Sending request");
        let response = self.authorize(builder)?.send().await?;
        read_envelope(response).await
    }

    /// Send a `multipart/form-data` request.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn send_form(
        &self,
        method: Method,
        path: &str,
        fields: &[(&str, &str)],
        file: Option<FileUpload>,
    ) -> Result<Envelope<Value>> {
        let mut form = fields.iter().fold(Form::new(), |form, (name, value)| {
            form.text((*name).to_string(), (*value).to_string())
        });
        if let Some(file) = file {
            let mut part = Part::bytes(file.bytes).file_name(file.file_name);
            if let Some(content_type) = file.content_type {
                part = part.mime_str(&content_type)?;
            }
            form = form.part(file.field, part);
        }

        tracing::debug!(method = %method, path = %path, "Sending form");
        let builder = self.http.request(method, self.url(path)).multipart(form);
        let response = self.authorize(builder)?.send().await?;
        read_envelope(response).await
    }

    // =========================================================================
    // Typed verbs
    // =========================================================================

    /// `GET` a path and decode its payload.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` if the payload has a different shape.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        payload(self.send(Method::GET, path, None).await?)
    }

    /// `GET` a list path, keeping the pagination block.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` if the payload is not a list of `T`.
    pub async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<(Vec<T>, Option<Pagination>)> {
        let envelope = self.send(Method::GET, path, None).await?;
        let pagination = envelope.pagination;
        Ok((payload(envelope)?, pagination))
    }

    /// `POST` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.with_body(Method::POST, path, body).await
    }

    /// `PUT` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.with_body(Method::PUT, path, body).await
    }

    /// `PATCH` a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.with_body(Method::PATCH, path, body).await
    }

    /// `DELETE` a path and return the server's message.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn delete(&self, path: &str) -> Result<Option<String>> {
        Ok(self.send(Method::DELETE, path, None).await?.message)
    }

    async fn with_body<T, B>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body).map_err(|e| ClientError::Parse(e.to_string()))?;
        payload(self.send(method, path, Some(&body)).await?)
    }

    /// Try each candidate path in order.
    ///
    /// Returns the first outcome that is not a 404. When every candidate is
    /// not found, the last not-found error is returned.
    ///
    /// # Errors
    ///
    /// Returns the first non-404 failure, the last 404, or
    /// `ClientError::NoCandidates` for an empty list.
    pub async fn get_first_available<T: DeserializeOwned>(&self, candidates: &[&str]) -> Result<T> {
        let mut last = ClientError::NoCandidates;
        for path in candidates {
            match self.get(path).await {
                Err(e) if e.is_not_found() => {
                    tracing::debug!(path = %path, "Candidate not found, trying next");
                    last = e;
                }
                outcome => return outcome,
            }
        }
        Err(last)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Log in and store the session.
    ///
    /// # Errors
    ///
    /// Returns the server's `INVALID_CREDENTIALS` or `INVALID_PASSWORD`
    /// failure, or a storage error if the session cannot be saved.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<LoginResponse> {
        let login: LoginResponse = self
            .post("/api/auth/login", &LoginRequest { email, password, role })
            .await?;

        self.credentials.save(&Credentials {
            token: login.token.clone(),
            user: login.user.clone(),
        })?;
        tracing::info!(user_id = %login.user.id, role = %role, "Logged in");
        Ok(login)
    }

    /// Forget the stored session. No request is sent.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be cleared.
    pub fn logout(&self) -> Result<()> {
        self.credentials.clear()
    }

    /// The user stored at login, without asking the server.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the session cannot be read.
    pub fn current_user(&self) -> Result<Option<UserProfile>> {
        Ok(self.credentials.load()?.map(|c| c.user))
    }

    /// Ask the server who the stored token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without sending a request when
    /// no token is stored.
    pub async fn me(&self) -> Result<UserProfile> {
        if self.credentials.load()?.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.get("/api/auth/me").await
    }

    // =========================================================================
    // Courses and enrollments
    // =========================================================================

    /// One page of the course catalogue.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn courses(&self, page: PageRequest) -> Result<(Vec<Course>, Option<Pagination>)> {
        self.get_page(&format!("/api/courses?page={}&limit={}", page.page(), page.limit()))
            .await
    }

    /// Courses with a free seat.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn available_courses(&self) -> Result<Vec<Course>> {
        self.get("/api/courses/available").await
    }

    /// Enroll the logged-in student in a course.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a stored token, or the
    /// server's `COURSE_NOT_FOUND`, `ALREADY_ENROLLED` or `COURSE_FULL`.
    pub async fn enroll(&self, course_id: &str) -> Result<Enrollment> {
        if self.credentials.load()?.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.post("/api/enrollments", &EnrollRequest { course_id }).await
    }

    /// The logged-in student's enrollments.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotAuthenticated` without a stored token.
    pub async fn my_enrollments(&self) -> Result<Vec<Enrollment>> {
        if self.credentials.load()?.is_none() {
            return Err(ClientError::NotAuthenticated);
        }
        self.get("/api/enrollments/student/me").await
    }
}

/// Turn a response into a success envelope or an API error.
async fn read_envelope(response: reqwest::Response) -> Result<Envelope<Value>> {
    let status = response.status();
    let bytes = response.bytes().await?;
    let body: Option<Value> = serde_json::from_slice(&bytes).ok();

    let rejected = body
        .as_ref()
        .and_then(|b| b.get("success"))
        .and_then(Value::as_bool)
        == Some(false);
    if !status.is_success() || rejected {
        let error = api_error(status, body.as_ref());
        tracing::debug!(status = status.as_u16(), error = %error, "Request failed");
        return Err(error);
    }

    let body = body.ok_or_else(|| ClientError::Parse("response body is not JSON".into()))?;
    serde_json::from_value(body).map_err(|e| ClientError::Parse(e.to_string()))
}

fn text_field<'a>(body: Option<&'a Value>, key: &str) -> Option<&'a str> {
    body.and_then(|b| b.get(key))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn api_error(status: StatusCode, body: Option<&Value>) -> ClientError {
    let message = text_field(body, "error")
        .or_else(|| text_field(body, "message"))
        .or_else(|| status.canonical_reason())
        .unwrap_or("Request failed")
        .to_string();

    ClientError::Api {
        status: status.as_u16(),
        code: text_field(body, "code").map(str::to_string),
        message,
    }
}

fn payload<T: DeserializeOwned>(envelope: Envelope<Value>) -> Result<T> {
    let data = envelope
        .data
        .ok_or_else(|| ClientError::Parse("response has no data".into()))?;
    serde_json::from_value(data).map_err(|e| ClientError::Parse(e.to_string()))
}
