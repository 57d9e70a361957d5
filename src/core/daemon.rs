//! Long-running background loop: per-second ticks plus the midnight,
//! auto-stop and email-report alarms.
//!
//! Runs on a current-thread runtime, so ticks and alarm handlers never overlap.

use crate::config::Config;
use crate::core::command::{Command, TrackerEvent};
use crate::core::scheduler::{AlarmName, Alarms, Fired, next_daily};
use crate::core::tracker::Tracker;
use crate::db::records::load_settings;
use crate::db::store::KvStore;
use crate::errors::AppResult;
use crate::models::settings::Settings;
use crate::report::mailer::Mailer;
use crate::report::{self, Delivery};
use crate::utils::date::{local_date, next_midnight};
use chrono::{DateTime, Days, TimeDelta, TimeZone, Utc};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info, warn};

pub struct Daemon<S: KvStore, Tz: TimeZone, M: Mailer> {
    tracker: Tracker<S, Tz>,
    alarms: Alarms,
    mailer: M,
    cfg: Config,
    /// Settings the email alarm was last armed from.
    settings: Option<Settings>,
}

impl<S, Tz, M> Daemon<S, Tz, M>
where
    S: KvStore,
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
    M: Mailer,
{
    pub fn new(tracker: Tracker<S, Tz>, mailer: M, cfg: Config) -> Self {
        Self {
            tracker,
            alarms: Alarms::new(),
            mailer,
            cfg,
            settings: None,
        }
    }

    pub fn tracker(&self) -> &Tracker<S, Tz> {
        &self.tracker
    }

    pub fn alarms(&self) -> &Alarms {
        &self.alarms
    }

    /// Arm every alarm from the persisted state.
    pub fn arm(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        let midnight = next_midnight(self.tracker.tz(), now)?;
        self.alarms.set(AlarmName::Midnight, midnight, None);
        self.setup_email_alarm(now)?;
        self.sync_auto_stop();
        Ok(())
    }

    /// (Re)schedule the daily report from the stored settings.
    pub fn setup_email_alarm(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        let settings = load_settings(self.tracker.store())?;
        self.settings = Some(settings.clone());
        if !settings.has_recipient() {
            if self.alarms.clear(AlarmName::EmailReport) {
                info!("email report alarm cleared: no recipient");
            }
            return Ok(());
        }

        let due = next_daily(self.tracker.tz(), settings.report_time()?, now)?;
        self.alarms
            .set(AlarmName::EmailReport, due, Some(TimeDelta::days(1)));
        info!("email report scheduled at {}", due);
        Ok(())
    }

    fn sync_auto_stop(&mut self) {
        let status = self.tracker.status();
        match status.auto_stop_at.filter(|_| status.is_working) {
            Some(at) => self.alarms.set(AlarmName::AutoStop, at, None),
            None => {
                self.alarms.clear(AlarmName::AutoStop);
            }
        }
    }

    /// One timer callback: recompute the session, re-arm the report if the
    /// settings changed, then run due alarms.
    pub async fn on_tick(&mut self, now: DateTime<Utc>) -> AppResult<Vec<TrackerEvent>> {
        let mut events = self.tracker.handle(Command::Tick, now)?.events;

        let settings = load_settings(self.tracker.store())?;
        if self.settings.as_ref() != Some(&settings) {
            debug!("settings changed, re-arming the email report");
            if let Err(e) = self.setup_email_alarm(now) {
                warn!("email report not re-armed: {}", e);
            }
        }

        for fired in self.alarms.take_due(now) {
            events.extend(self.on_alarm(fired, now).await?);
        }

        self.sync_auto_stop();
        Ok(events)
    }

    async fn on_alarm(&mut self, fired: Fired, now: DateTime<Utc>) -> AppResult<Vec<TrackerEvent>> {
        debug!("alarm {} fired (due {})", fired.name, fired.due);

        match fired.name {
            AlarmName::AutoStop => Ok(self.tracker.handle(Command::Tick, now)?.events),
            AlarmName::Midnight => {
                let events = self.tracker.handle(Command::Tick, now)?.events;
                let next = next_midnight(self.tracker.tz(), now)?;
                self.alarms.set(AlarmName::Midnight, next, None);
                Ok(events)
            }
            AlarmName::EmailReport => {
                let due_day = local_date(self.tracker.tz(), fired.due);
                let Some(day) = due_day.checked_sub_days(Days::new(1)) else {
                    return Ok(Vec::new());
                };
                let tz = self.tracker.tz().clone();

                match report::send_daily_report(
                    self.tracker.store_mut(),
                    &tz,
                    &self.mailer,
                    &self.cfg,
                    day,
                    now,
                )
                .await
                {
                    Ok(Delivery::Sent { attempts }) => {
                        info!("daily report for {} sent after {} attempt(s)", day, attempts)
                    }
                    Ok(Delivery::Queued { id, error }) => {
                        warn!("daily report for {} queued as {}: {}", day, id, error)
                    }
                    Ok(Delivery::Skipped) => {}
                    Err(e) => error!("daily report for {} failed: {}", day, e),
                }
                Ok(Vec::new())
            }
        }
    }

    /// Tick until `shutdown` resolves. Storage errors end the loop.
    pub async fn run<F, C>(mut self, shutdown: F, mut on_events: C) -> AppResult<()>
    where
        F: Future<Output = ()>,
        C: FnMut(&[TrackerEvent]),
    {
        self.arm(Utc::now())?;

        let mut interval = tokio::time::interval(Duration::from_secs(self.cfg.tick_seconds.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let events = self.on_tick(Utc::now()).await?;
                    if !events.is_empty() {
                        on_events(&events);
                    }
                }
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
            }
        }

        Ok(())
    }
}
