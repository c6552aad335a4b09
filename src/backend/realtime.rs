//! Realtime change feed over websocket (Phoenix channel protocol).
//!
//! The feed delivers `INSERT` / `UPDATE` / `DELETE` notifications for one
//! table, filtered server-side on the owner column. Frames are plain JSON:
//! `{"topic": .., "event": .., "payload": .., "ref": ..}`.

use super::{ChangeEvent, ChangeKind, Table};
use crate::errors::{AppError, AppResult};
use crate::models::session::Session;
use serde_json::{Value, json};
use std::io;
use std::net::TcpStream;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const PROTOCOL_VERSION: &str = "1.0.0";

/// A decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Reply to our join with status "ok".
    Joined,
    Change(ChangeEvent),
    /// Join refused, channel error or system error.
    Error(String),
    Closed,
    /// Heartbeat replies, presence, and anything else we don't act on.
    Ignored,
}

/// `https://x.supabase.co` → `wss://x.supabase.co/realtime/v1/websocket?apikey=..&vsn=1.0.0`
pub fn realtime_url(base_url: &str, anon_key: &str) -> AppResult<String> {
    let mut url = url::Url::parse(base_url.trim())
        .map_err(|e| AppError::Config(format!("invalid backend_url '{}': {}", base_url, e)))?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(AppError::Config(format!(
                "unsupported backend_url scheme '{}'",
                other
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| AppError::Config(format!("cannot use scheme '{}'", scheme)))?;

    let path = format!("{}/realtime/v1/websocket", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut()
        .clear()
        .append_pair("apikey", anon_key)
        .append_pair("vsn", PROTOCOL_VERSION);

    Ok(url.to_string())
}

pub fn channel_topic(table: Table, user_id: &str) -> String {
    format!("realtime:{}-{}", table.name(), user_id)
}

pub fn join_frame(topic: &str, table: Table, session: &Session, reference: u64) -> String {
    json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": table.name(),
                    "filter": format!("user_id=eq.{}", session.user_id),
                }],
            },
            "access_token": session.access_token,
        },
        "ref": reference.to_string(),
        "join_ref": reference.to_string(),
    })
    .to_string()
}

pub fn heartbeat_frame(reference: u64) -> String {
    json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": reference.to_string(),
    })
    .to_string()
}

pub fn leave_frame(topic: &str, reference: u64) -> String {
    json!({
        "topic": topic,
        "event": "phx_leave",
        "payload": {},
        "ref": reference.to_string(),
    })
    .to_string()
}

/// Decode one text frame addressed to `topic`. Only the reply carrying
/// `join_ref` can accept or refuse the subscription.
pub fn parse_frame(text: &str, topic: &str, join_ref: &str) -> AppResult<Frame> {
    let v: Value = serde_json::from_str(text)?;

    let frame_topic = v.get("topic").and_then(Value::as_str).unwrap_or_default();
    let event = v.get("event").and_then(Value::as_str).unwrap_or_default();
    let payload = v.get("payload").cloned().unwrap_or(Value::Null);
    let reference = v.get("ref").and_then(Value::as_str);

    if frame_topic != topic {
        return Ok(Frame::Ignored);
    }

    let frame = match event {
        "phx_reply" if reference != Some(join_ref) => Frame::Ignored,
        "phx_reply" => match payload.get("status").and_then(Value::as_str) {
            Some("ok") => Frame::Joined,
            _ => Frame::Error(reply_reason(&payload)),
        },
        "postgres_changes" => parse_change(&payload).map_or(Frame::Ignored, Frame::Change),
        "system" => match payload.get("status").and_then(Value::as_str) {
            Some("error") => Frame::Error(reply_reason(&payload)),
            _ => Frame::Ignored,
        },
        "phx_error" => Frame::Error("channel error".into()),
        "phx_close" => Frame::Closed,
        _ => Frame::Ignored,
    };

    Ok(frame)
}

fn reply_reason(payload: &Value) -> String {
    payload
        .pointer("/response/reason")
        .or_else(|| payload.get("message"))
        .and_then(Value::as_str)
        .unwrap_or("subscription refused")
        .to_string()
}

fn parse_change(payload: &Value) -> Option<ChangeEvent> {
    let data = payload.get("data")?;
    let kind = ChangeKind::from_wire(data.get("type")?.as_str()?)?;
    let table = Table::from_name(data.get("table")?.as_str()?)?;

    let non_empty = |key: &str| {
        data.get(key)
            .filter(|v| v.as_object().is_some_and(|o| !o.is_empty()))
            .cloned()
    };

    Some(ChangeEvent {
        table,
        kind,
        record: non_empty("record"),
        old_record: non_empty("old_record"),
    })
}

/// A joined subscription on one table.
pub struct RealtimeChannel {
    socket: WebSocket<MaybeTlsStream<TcpStream>>,
    topic: String,
    join_ref: String,
    next_ref: u64,
    last_heartbeat: Instant,
}

impl RealtimeChannel {
    /// Connect and join the change feed of `table` for the session's user.
    pub fn subscribe(
        base_url: &str,
        anon_key: &str,
        session: &Session,
        table: Table,
    ) -> AppResult<Self> {
        let url = realtime_url(base_url, anon_key)?;
        let (mut socket, _response) = tungstenite::connect(url.as_str())?;
        set_read_timeout(&mut socket, Some(READ_TIMEOUT))?;

        let topic = channel_topic(table, &session.user_id);
        let mut channel = Self {
            socket,
            topic,
            join_ref: String::new(),
            next_ref: 1,
            last_heartbeat: Instant::now(),
        };

        let reference = channel.take_ref();
        channel.join_ref = reference.to_string();
        let join = join_frame(&channel.topic, table, session, reference);
        channel.socket.send(Message::Text(join))?;

        // Wait for the join reply; changes cannot arrive before it.
        loop {
            match channel.read_frame()? {
                Some(Frame::Joined) => break,
                Some(Frame::Error(reason)) => return Err(AppError::Realtime(reason)),
                Some(Frame::Closed) | None => {
                    return Err(AppError::Realtime("connection closed while joining".into()));
                }
                Some(_) => continue,
            }
        }

        info!(topic = %channel.topic, "joined realtime channel");
        Ok(channel)
    }

    /// Block until the next change. `Ok(None)` when the server closes the feed.
    pub fn next_change(&mut self) -> AppResult<Option<ChangeEvent>> {
        loop {
            match self.read_frame()? {
                Some(Frame::Change(change)) => return Ok(Some(change)),
                Some(Frame::Error(reason)) => return Err(AppError::Realtime(reason)),
                Some(Frame::Closed) | None => return Ok(None),
                Some(Frame::Joined) | Some(Frame::Ignored) => continue,
            }
        }
    }

    pub fn close(mut self) -> AppResult<()> {
        let reference = self.take_ref();
        let leave = leave_frame(&self.topic, reference);
        self.socket.send(Message::Text(leave))?;
        self.socket.close(None)?;
        Ok(())
    }

    fn take_ref(&mut self) -> u64 {
        let r = self.next_ref;
        self.next_ref += 1;
        r
    }

    fn heartbeat_if_due(&mut self) -> AppResult<()> {
        if self.last_heartbeat.elapsed() >= HEARTBEAT_INTERVAL {
            let reference = self.take_ref();
            self.socket.send(Message::Text(heartbeat_frame(reference)))?;
            self.last_heartbeat = Instant::now();
            trace!(reference, "heartbeat sent");
        }
        Ok(())
    }

    /// Next decoded frame; `None` on a websocket close.
    fn read_frame(&mut self) -> AppResult<Option<Frame>> {
        loop {
            self.heartbeat_if_due()?;

            match self.socket.read() {
                Ok(Message::Text(text)) => {
                    debug!(frame = %text, "realtime frame");
                    return parse_frame(&text, &self.topic, &self.join_ref).map(Some);
                }
                Ok(Message::Close(_)) => return Ok(None),
                Ok(_) => continue,
                Err(tungstenite::Error::Io(e))
                    if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
                {
                    continue;
                }
                Err(tungstenite::Error::ConnectionClosed) => return Ok(None),
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn set_read_timeout(
    socket: &mut WebSocket<MaybeTlsStream<TcpStream>>,
    timeout: Option<Duration>,
) -> AppResult<()> {
    match socket.get_mut() {
        MaybeTlsStream::Plain(s) => s.set_read_timeout(timeout)?,
        MaybeTlsStream::Rustls(s) => s.sock.set_read_timeout(timeout)?,
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            access_token: "tok".into(),
            refresh_token: "ref".into(),
            expires_at: 0,
            user_id: "u1".into(),
            email: None,
        }
    }

    #[test]
    fn url_switches_to_websocket_scheme() {
        let url = realtime_url("https://abc.supabase.co/", "KEY").unwrap();
        assert_eq!(
            url,
            "wss://abc.supabase.co/realtime/v1/websocket?apikey=KEY&vsn=1.0.0"
        );

        let url = realtime_url("http://localhost:54321", "k").unwrap();
        assert!(url.starts_with("ws://localhost:54321/realtime/v1/websocket?"));
    }

    #[test]
    fn join_frame_filters_on_owner() {
        let topic = channel_topic(Table::Events, "u1");
        let frame: Value = serde_json::from_str(&join_frame(&topic, Table::Events, &session(), 1)).unwrap();

        assert_eq!(frame["event"], "phx_join");
        assert_eq!(frame["topic"], "realtime:events-u1");
        let change = &frame["payload"]["config"]["postgres_changes"][0];
        assert_eq!(change["table"], "events");
        assert_eq!(change["filter"], "user_id=eq.u1");
        assert_eq!(frame["payload"]["access_token"], "tok");
    }

    #[test]
    fn change_frames_are_decoded() {
        let topic = "realtime:events-u1";
        let text = r#"{"topic":"realtime:events-u1","event":"postgres_changes","ref":null,
            "payload":{"ids":[1],"data":{"type":"DELETE","table":"events","schema":"public",
            "record":{},"old_record":{"id":"e9"}}}}"#;

        let Frame::Change(change) = parse_frame(text, topic, "1").unwrap() else {
            panic!("expected a change frame");
        };
        assert_eq!(change.kind, ChangeKind::Delete);
        assert_eq!(change.table, Table::Events);
        assert!(change.record.is_none());
        assert_eq!(change.row_id(), Some("e9"));
    }

    #[test]
    fn join_reply_and_errors() {
        let topic = "realtime:events-u1";
        let ok = r#"{"topic":"realtime:events-u1","event":"phx_reply","ref":"1","join_ref":"1",
            "payload":{"status":"ok","response":{}}}"#;
        assert_eq!(parse_frame(ok, topic, "1").unwrap(), Frame::Joined);

        let refused = r#"{"topic":"realtime:events-u1","event":"phx_reply","ref":"1",
            "payload":{"status":"error","response":{"reason":"Invalid JWT"}}}"#;
        assert_eq!(
            parse_frame(refused, topic, "1").unwrap(),
            Frame::Error("Invalid JWT".into())
        );

        let other_topic = r#"{"topic":"phoenix","event":"phx_reply","ref":"2","payload":{"status":"ok"}}"#;
        assert_eq!(parse_frame(other_topic, topic, "1").unwrap(), Frame::Ignored);
    }

    #[test]
    fn replies_to_other_refs_do_not_end_the_feed() {
        let topic = "realtime:events-u1";
        let leave_refused = r#"{"topic":"realtime:events-u1","event":"phx_reply","ref":"7",
            "payload":{"status":"error","response":{"reason":"unmatched topic"}}}"#;
        assert_eq!(parse_frame(leave_refused, topic, "1").unwrap(), Frame::Ignored);

        let late_ok = r#"{"topic":"realtime:events-u1","event":"phx_reply","ref":"3",
            "payload":{"status":"ok","response":{}}}"#;
        assert_eq!(parse_frame(late_ok, topic, "1").unwrap(), Frame::Ignored);

        assert_eq!(
            parse_frame(leave_refused, topic, "7").unwrap(),
            Frame::Error("unmatched topic".into())
        );
    }
}
