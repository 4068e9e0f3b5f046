//! HTTP polling (pull transport) client session.
//!
//! ## 作業記録
//!
//! push セッションと違い、サーバからの自発的な通知はない。join で
//! 接続 ID を受け取り、以後は一定間隔の Fetch で差分を取り込む。
//! Fetch 自体がプレゼンスのハートビートでもあるため、ポーリングを
//! 止めた参加者はサーバ側のスイープで退去させられる。

use irori_server::infrastructure::dto::http::{
    PollErrorResponse, PollFetchResponse, PollJoinResponse, PollLeaveResponse,
    PollMessageResponse, PollRequest,
};

use crate::{error::ClientError, mirror::ChatMirror};

/// One pull-transport session against a chat server
pub struct PollSession {
    http: reqwest::Client,
    /// Base URL of the server, e.g. `http://127.0.0.1:8080`
    base_url: String,
    /// Display name sent on join; echoed in message actions
    display_name: Option<String>,
    mirror: ChatMirror,
}

impl PollSession {
    pub fn new(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            display_name: None,
            mirror: ChatMirror::new(),
        }
    }

    pub fn mirror(&self) -> &ChatMirror {
        &self.mirror
    }

    pub fn mirror_mut(&mut self) -> &mut ChatMirror {
        &mut self.mirror
    }

    fn poll_url(&self) -> String {
        format!("{}/poll", self.base_url)
    }

    /// Register with the server; the assigned connection id is stored in
    /// the mirror and used for subsequent requests
    pub async fn join(
        &mut self,
        display_name: &str,
        room: Option<&str>,
    ) -> Result<String, ClientError> {
        let request = PollRequest::Join {
            user_id: self.mirror.user_id().map(|s| s.to_string()),
            display_name: display_name.to_string(),
            room: room.map(|r| r.to_string()),
        };

        let response = self
            .http
            .post(self.poll_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let body: PollJoinResponse = decode(response).await?;

        self.display_name = Some(display_name.to_string());
        self.mirror.set_user_id(body.user_id.clone());
        self.mirror.set_connected(true);
        Ok(body.user_id)
    }

    /// Fetch updates since the cursor; returns the number of new messages
    pub async fn fetch(&mut self) -> Result<usize, ClientError> {
        let mut request = self
            .http
            .get(self.poll_url())
            .query(&[("lastMessageId", self.mirror.cursor().to_string())]);
        if let Some(user_id) = self.mirror.user_id() {
            request = request.query(&[("userId", user_id)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let body: PollFetchResponse = decode(response).await?;

        self.mirror.replace_roster(body.connected_users);
        Ok(self.mirror.record_batch(body.messages))
    }

    /// Send a chat message, then fetch so the own message is mirrored
    /// without waiting for the next tick
    pub async fn send(&mut self, text: &str) -> Result<(), ClientError> {
        let user_id = self.mirror.user_id().ok_or(ClientError::NotJoined)?;
        let request = PollRequest::Message {
            text: text.to_string(),
            user: self.display_name.clone().unwrap_or_default(),
            user_id: user_id.to_string(),
        };

        let response = self
            .http
            .post(self.poll_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let _: PollMessageResponse = decode(response).await?;

        self.fetch().await?;
        Ok(())
    }

    /// Deregister from the server
    pub async fn leave(&mut self) -> Result<(), ClientError> {
        let user_id = self.mirror.user_id().ok_or(ClientError::NotJoined)?;
        let request = PollRequest::Leave {
            user_id: user_id.to_string(),
        };

        let response = self
            .http
            .post(self.poll_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
        let _: PollLeaveResponse = decode(response).await?;

        self.mirror.set_connected(false);
        Ok(())
    }
}

/// Decode a poll response, mapping error statuses to [`ClientError::Rejected`]
async fn decode<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::MalformedPayload(e.to_string()))
    } else {
        let message = match response.json::<PollErrorResponse>().await {
            Ok(body) => body.error,
            Err(_) => status.to_string(),
        };
        Err(ClientError::Rejected(message))
    }
}
