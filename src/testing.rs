//! Fakes shared by the unit tests.

use async_trait::async_trait;
use serenity::model::id::{ChannelId, GuildId};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use crate::{
    audio::{
        player::TrackControl,
        voice::{VoiceConnection, VoiceError, VoiceGateway},
    },
    session::{Services, SessionSettings, SessionStore, SharedSession, TrackEndNotifier},
    sources::{MockTrackResolver, ResolverError, TrackResolver},
    ui::Announcer,
};

pub fn guild() -> GuildId {
    GuildId::new(1)
}

pub fn voice_channel() -> ChannelId {
    ChannelId::new(20)
}

pub fn text_channel() -> ChannelId {
    ChannelId::new(30)
}

/// Last path segment of a URL, used as its title.
pub fn title_of(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Resolver that accepts `https://` URLs as-is, titles them with
/// [`title_of`] and answers searches with `search`.
pub fn resolver<F>(search: F) -> MockTrackResolver
where
    F: Fn(&str) -> Result<Option<String>, ResolverError> + Send + 'static,
{
    let mut resolver = MockTrackResolver::new();
    resolver
        .expect_validate_url()
        .returning(|candidate| candidate.starts_with("https://"));
    resolver
        .expect_get_title()
        .returning(|url| Ok(title_of(url)));
    resolver
        .expect_resolve_by_text()
        .returning(move |query| search(query));
    resolver
}

/// Never answers a search in time.
pub struct SlowResolver;

#[async_trait]
impl TrackResolver for SlowResolver {
    fn validate_url(&self, _candidate: &str) -> bool {
        false
    }

    async fn resolve_by_text(&self, _query: &str) -> Result<Option<String>, ResolverError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(None)
    }

    async fn get_title(&self, url: &str) -> Result<String, ResolverError> {
        Ok(title_of(url))
    }
}

/// Shared list of control calls made on fake tracks.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<&'static str>>>);

impl CallLog {
    fn record(&self, call: &'static str) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

pub struct FakeTrack {
    log: CallLog,
    fail: bool,
}

impl FakeTrack {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone(), fail: false }, log)
    }

    pub fn failing() -> (Self, CallLog) {
        let log = CallLog::default();
        (Self { log: log.clone(), fail: true }, log)
    }

    fn control(&self, call: &'static str) -> Result<(), VoiceError> {
        if self.fail {
            return Err(VoiceError::Control("track is gone".into()));
        }
        self.log.record(call);
        Ok(())
    }
}

impl TrackControl for FakeTrack {
    fn pause(&self) -> Result<(), VoiceError> {
        self.control("pause")
    }

    fn resume(&self) -> Result<(), VoiceError> {
        self.control("resume")
    }

    fn stop(&self) -> Result<(), VoiceError> {
        self.control("stop")
    }
}

#[derive(Default)]
struct VoiceLog {
    connects: Vec<ChannelId>,
    plays: Vec<String>,
    notifiers: Vec<TrackEndNotifier>,
    disconnects: usize,
    calls: Vec<Arc<AtomicBool>>,
}

/// Voice gateway that records everything and plays nothing.
#[derive(Clone, Default)]
pub struct FakeVoice {
    log: Arc<Mutex<VoiceLog>>,
    tracks: CallLog,
    failing_urls: Vec<String>,
}

impl FakeVoice {
    /// Makes `play` fail for `url`.
    pub fn failing_on(mut self, url: &str) -> Self {
        self.failing_urls.push(url.to_string());
        self
    }

    pub fn connects(&self) -> Vec<ChannelId> {
        self.log.lock().unwrap().connects.clone()
    }

    /// URLs that started playing, in order.
    pub fn plays(&self) -> Vec<String> {
        self.log.lock().unwrap().plays.clone()
    }

    pub fn disconnects(&self) -> usize {
        self.log.lock().unwrap().disconnects
    }

    /// End notifier handed over with the `index`-th successful play.
    pub fn notifier(&self, index: usize) -> TrackEndNotifier {
        self.log.lock().unwrap().notifiers[index].clone()
    }

    /// Drops the most recent call from its channel, as a kick would.
    pub fn kick(&self) {
        if let Some(call) = self.log.lock().unwrap().calls.last() {
            call.store(false, Ordering::SeqCst);
        }
    }

    /// Pause/resume calls; stops are left out since every skip makes one.
    pub fn track_calls(&self) -> Vec<&'static str> {
        self.tracks
            .calls()
            .into_iter()
            .filter(|call| *call != "stop")
            .collect()
    }
}

#[async_trait]
impl VoiceGateway for FakeVoice {
    async fn connect(
        &self,
        _guild_id: GuildId,
        channel_id: ChannelId,
    ) -> Result<Arc<dyn VoiceConnection>, VoiceError> {
        let live = Arc::new(AtomicBool::new(true));

        let mut log = self.log.lock().unwrap();
        log.connects.push(channel_id);
        log.calls.push(live.clone());

        Ok(Arc::new(FakeConnection {
            channel_id,
            voice: self.clone(),
            live,
        }))
    }
}

struct FakeConnection {
    channel_id: ChannelId,
    voice: FakeVoice,
    live: Arc<AtomicBool>,
}

#[async_trait]
impl VoiceConnection for FakeConnection {
    fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    async fn play(
        &self,
        url: &str,
        on_end: TrackEndNotifier,
    ) -> Result<Box<dyn TrackControl>, VoiceError> {
        if self.voice.failing_urls.iter().any(|failing| failing == url) {
            return Err(VoiceError::Control(format!("can't open {}", url)));
        }

        let mut log = self.voice.log.lock().unwrap();
        log.plays.push(url.to_string());
        log.notifiers.push(on_end);

        Ok(Box::new(FakeTrack {
            log: self.voice.tracks.clone(),
            fail: false,
        }))
    }

    async fn disconnect(&self) -> Result<(), VoiceError> {
        self.live.store(false, Ordering::SeqCst);
        self.voice.log.lock().unwrap().disconnects += 1;
        Ok(())
    }

    async fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingAnnouncer {
    messages: Mutex<Vec<(ChannelId, String)>>,
}

impl RecordingAnnouncer {
    pub fn messages(&self) -> Vec<(ChannelId, String)> {
        self.messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl Announcer for RecordingAnnouncer {
    async fn announce(&self, channel_id: ChannelId, text: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((channel_id, text.to_string()));
    }
}

pub struct Harness {
    pub store: SessionStore,
    pub voice: FakeVoice,
    pub announcer: Arc<RecordingAnnouncer>,
}

impl Harness {
    pub fn new(resolver: impl TrackResolver + 'static) -> Self {
        Self::with_voice(resolver, FakeVoice::default())
    }

    pub fn with_voice(resolver: impl TrackResolver + 'static, voice: FakeVoice) -> Self {
        Self::with_limits(resolver, voice, 100)
    }

    pub fn with_limits(
        resolver: impl TrackResolver + 'static,
        voice: FakeVoice,
        max_queue_size: usize,
    ) -> Self {
        let announcer = Arc::new(RecordingAnnouncer::default());
        let services = Services {
            resolver: Arc::new(resolver),
            voice: Arc::new(voice.clone()),
            announcer: announcer.clone(),
            settings: SessionSettings {
                resolver_timeout: Duration::from_millis(50),
                max_queue_size,
            },
        };

        Self {
            store: SessionStore::new(services),
            voice,
            announcer,
        }
    }

    /// The guild's session, with announcements routed to [`text_channel`].
    pub async fn session(&self) -> SharedSession {
        let session = self.store.get_or_create(guild());
        session.lock().await.set_text_channel(text_channel());
        session
    }
}
