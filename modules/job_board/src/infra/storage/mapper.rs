use anyhow::{anyhow, Context};
use chrono::DateTime;
use uuid::Uuid;

use crate::contract::model::{Job, Session, User};
use crate::infra::storage::entity::{JobRow, SessionRow, UserRow};

fn parse_id(raw: &str) -> anyhow::Result<Uuid> {
    Uuid::parse_str(raw).with_context(|| format!("malformed id '{raw}' in storage"))
}

impl TryFrom<UserRow> for User {
    type Error = anyhow::Error;

    fn try_from(r: UserRow) -> anyhow::Result<Self> {
        Ok(Self {
            id: parse_id(&r.id)?,
            username: r.username,
            email: r.email,
            password_hash: r.password_hash,
            created_at: r.created_at,
        })
    }
}

impl TryFrom<JobRow> for Job {
    type Error = anyhow::Error;

    fn try_from(r: JobRow) -> anyhow::Result<Self> {
        let salary = r
            .salary
            .map(u32::try_from)
            .transpose()
            .with_context(|| format!("salary out of range for job {}", r.id))?;
        Ok(Self {
            id: parse_id(&r.id)?,
            title: r.title,
            description: r.description,
            company: r.company,
            location: r.location,
            salary,
            created_at: r.created_at,
        })
    }
}

impl TryFrom<SessionRow> for Session {
    type Error = anyhow::Error;

    fn try_from(r: SessionRow) -> anyhow::Result<Self> {
        let expires_at = DateTime::from_timestamp(r.expires_at, 0)
            .ok_or_else(|| anyhow!("session expiry {} out of range", r.expires_at))?;
        Ok(Self {
            user_id: r.user_id.as_deref().map(parse_id).transpose()?,
            id: r.id,
            username: r.username,
            expires_at,
        })
    }
}
