use crate::domain::{
    AnnotationView, Collector, CommentView, ReadError, ReadPathConfig, ReadResponse,
    RecentAnnotationsCache,
};
use crate::ports::LocationSync;
use crate::service::profiles::ProfileResolver;
use futures::future::join_all;
use mg_02_graph_store::GraphApi;
use mg_03_shard_router::ShardingApi;
use shared_bus::{EventFilter, EventSubscriber, GraphEvent};
use shared_types::{
    fields, Annotation, Comment, GraphPut, Node, Soul, SoulKind, TimeSource, WriteOrigin,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Annotation read path over the local graph store.
pub struct ReadService {
    pub(crate) graph: Arc<dyn GraphApi>,
    pub(crate) bus: Arc<dyn EventSubscriber>,
    pub(crate) router: Arc<dyn ShardingApi>,
    pub(crate) time: Arc<dyn TimeSource>,
    pub(crate) sync: Option<Arc<dyn LocationSync>>,
    pub(crate) profiles: ProfileResolver,
    pub(crate) recent: RecentAnnotationsCache,
    pub(crate) config: ReadPathConfig,
}

/// Offer an annotation node to the collector, optionally restricted to one id.
fn offer_annotation(collector: &mut Collector<Annotation>, node: &Node, only: Option<&str>) {
    if !matches!(node.soul.kind(), SoulKind::Annotation { .. }) {
        return;
    }
    let id = node.soul.last_segment();
    if only.is_some_and(|wanted| wanted != id) {
        return;
    }
    if node.is_tombstoned() && !node.has_content() {
        collector.mark_gone(id.to_string());
        return;
    }
    match Annotation::from_fields(&node.fields) {
        Ok(annotation) => collector.offer(annotation),
        Err(e) => debug!(soul = %node.soul, error = %e, "[mg-05] Skipping malformed annotation"),
    }
}

fn offer_comment(collector: &mut Collector<Comment>, node: &Node) {
    if node.is_tombstoned() && !node.has_content() {
        collector.mark_gone(node.soul.last_segment().to_string());
        return;
    }
    match Comment::from_fields(&node.fields) {
        Ok(comment) => collector.offer(comment),
        Err(e) => debug!(soul = %node.soul, error = %e, "[mg-05] Skipping malformed comment"),
    }
}

impl ReadService {
    pub fn new(
        graph: Arc<dyn GraphApi>,
        bus: Arc<dyn EventSubscriber>,
        router: Arc<dyn ShardingApi>,
        time: Arc<dyn TimeSource>,
        sync: Option<Arc<dyn LocationSync>>,
        config: ReadPathConfig,
    ) -> Self {
        Self {
            profiles: ProfileResolver::new(graph.clone(), sync.clone(), time.clone(), &config),
            recent: RecentAnnotationsCache::new(config.recent_capacity),
            graph,
            bus,
            router,
            time,
            sync,
            config,
        }
    }

    pub fn config(&self) -> &ReadPathConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileResolver {
        &self.profiles
    }

    pub fn recent_cache(&self) -> &RecentAnnotationsCache {
        &self.recent
    }

    pub(crate) async fn read(&self, url: &str, only: Option<&str>) -> Result<ReadResponse, ReadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ReadError::MissingUrl);
        }
        let candidates = self.router.placement(url).locations();

        let annotations = self.collect_annotations(&candidates, only).await?;
        let views = join_all(
            annotations
                .into_iter()
                .map(|annotation| self.assemble(annotation, &candidates)),
        )
        .await;
        self.mark_synced(&candidates).await;

        if views.is_empty() {
            return Err(ReadError::NotFound);
        }
        for view in &views {
            self.recent.record(view.annotation.clone());
        }
        Ok(ReadResponse { annotations: views })
    }

    /// Gather live annotations from every candidate location.
    ///
    /// The subscription opens before anything is read, so a record applied
    /// between the local read and the end of the window is still seen. The
    /// window closes when every candidate pull has finished or
    /// `collection_window_ms` elapses, whichever comes first. Pulls still
    /// running at that point keep going in the background.
    async fn collect_annotations(
        &self,
        candidates: &[Soul],
        only: Option<&str>,
    ) -> Result<Vec<Annotation>, ReadError> {
        let mut subscription = self.bus.subscribe(EventFilter::children_of(candidates.to_vec()));
        let pulls: Vec<_> = match &self.sync {
            Some(sync) => candidates
                .iter()
                .map(|location| {
                    let sync = sync.clone();
                    let location = location.clone();
                    tokio::spawn(async move { sync.sync_location(&location).await })
                })
                .collect(),
            None => Vec::new(),
        };

        let mut collector = Collector::default();
        let mut failures = 0;
        for location in candidates {
            match self.graph.children(location) {
                Ok(nodes) => {
                    for node in &nodes {
                        offer_annotation(&mut collector, node, only);
                    }
                }
                Err(e) => {
                    warn!(location = %location, error = %e, "[mg-05] Candidate read failed");
                    failures += 1;
                }
            }
        }
        if failures == candidates.len() {
            return Err(ReadError::Internal(format!(
                "all {failures} candidate locations failed"
            )));
        }

        let pending = join_all(pulls);
        let window = tokio::time::sleep(Duration::from_millis(self.config.collection_window_ms));
        tokio::pin!(pending, window);
        loop {
            tokio::select! {
                _ = &mut window => {
                    debug!("[mg-05] Collection window elapsed");
                    break;
                }
                _ = &mut pending => break,
                event = subscription.recv() => match event {
                    Some(GraphEvent::NodeUpdated { node, .. }) => {
                        offer_annotation(&mut collector, &node, only);
                    }
                    Some(_) => {}
                    None => break,
                },
            }
        }
        while let Ok(Some(event)) = subscription.try_recv() {
            if let GraphEvent::NodeUpdated { node, .. } = event {
                offer_annotation(&mut collector, &node, only);
            }
        }

        Ok(collector.into_newest_first())
    }

    async fn assemble(&self, annotation: Annotation, candidates: &[Soul]) -> AnnotationView {
        let mut collector = Collector::default();
        for location in candidates {
            let index = Soul::comments(&Soul::annotation(location, &annotation.id));
            match self.graph.children(&index) {
                Ok(nodes) => {
                    for node in &nodes {
                        offer_comment(&mut collector, node);
                    }
                }
                Err(e) => debug!(index = %index, error = %e, "[mg-05] Comment read failed"),
            }
        }
        let mut comments = collector.into_newest_first();
        comments.reverse();

        let author = self.profiles.resolve(&annotation.author);
        let commenters = join_all(comments.iter().map(|c| self.profiles.resolve(&c.author)));
        let (author_profile, commenter_profiles) = futures::join!(author, commenters);

        AnnotationView {
            comments: comments
                .into_iter()
                .zip(commenter_profiles)
                .map(|(comment, author_profile)| CommentView {
                    comment,
                    author_profile,
                })
                .collect(),
            annotation,
            author_profile,
        }
    }

    /// Touch every candidate location so replicas that missed it notice.
    async fn mark_synced(&self, candidates: &[Soul]) {
        let now = self.time.now_ms();
        for location in candidates {
            let put = GraphPut::field(location.clone(), fields::SYNC_MARKER, now as i64);
            if let Err(e) = self.graph.put(put, WriteOrigin::Local).await {
                debug!(location = %location, error = %e, "[mg-05] Sync marker not written");
            }
        }
    }
}
