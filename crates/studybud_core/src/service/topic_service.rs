//! Topic use-case service.

use crate::model::topic::{NewTopic, Topic, TopicId, TopicUpdate};
use crate::repo::topic_repo::TopicRepository;
use crate::repo::{ListQuery, RepoResult};

pub struct TopicService<R: TopicRepository> {
    repo: R,
}

impl<R: TopicRepository> TopicService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_topic(&self, name: impl Into<String>) -> RepoResult<Topic> {
        self.repo.create_topic(&NewTopic::new(name))
    }

    pub fn get_topic(&self, id: TopicId) -> RepoResult<Option<Topic>> {
        self.repo.get_topic(id)
    }

    pub fn list_topics(&self, query: &ListQuery) -> RepoResult<Vec<Topic>> {
        self.repo.list_topics(query)
    }

    pub fn rename_topic(&self, id: TopicId, name: impl Into<String>) -> RepoResult<Topic> {
        self.repo.update_topic(
            id,
            &TopicUpdate {
                name: Some(name.into()),
            },
        )
    }

    /// Deletes a topic; rooms labelled with it keep existing untagged.
    pub fn delete_topic(&self, id: TopicId) -> RepoResult<()> {
        self.repo.delete_topic(id)
    }
}
