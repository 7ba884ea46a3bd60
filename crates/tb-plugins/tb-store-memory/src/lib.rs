//! # tb-store-memory
//!
//! In-memory implementations of `PostRepo` and `TodoRepo`, backed by
//! ordered vectors behind an `RwLock`. Used as the production backend
//! for the two mock collections and as the test backend everywhere.

use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use tb_core::error::{AppError, Result};
use tb_core::models::{Post, Todo};
use tb_core::traits::{PostRepo, TodoRepo};

pub struct InMemoryPostRepo {
    posts: RwLock<Vec<Post>>,
}

impl Default for InMemoryPostRepo {
    /// Seeds the same two demo posts the service has always shipped with.
    fn default() -> Self {
        Self {
            posts: RwLock::new(vec![
                Post {
                    id: 1,
                    title: "First post".to_string(),
                    content: "Contents of the first post".to_string(),
                },
                Post {
                    id: 2,
                    title: "Second post".to_string(),
                    content: "Contents of the second post".to_string(),
                },
            ]),
        }
    }
}

impl InMemoryPostRepo {
    pub fn empty() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Post>> {
        self.posts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Post>> {
        self.posts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl PostRepo for InMemoryPostRepo {
    async fn list(&self) -> Result<Vec<Post>> {
        Ok(self.read().clone())
    }

    /// Ids are wall-clock milliseconds at creation time.
    async fn create(&self, title: String, content: String) -> Result<Post> {
        let post = Post {
            id: chrono::Utc::now().timestamp_millis(),
            title,
            content,
        };
        self.write().push(post.clone());
        Ok(post)
    }

    async fn replace(&self, id: i64, title: String, content: String) -> Result<Post> {
        let mut posts = self.write();
        match posts.iter_mut().find(|post| post.id == id) {
            Some(post) => {
                post.title = title;
                post.content = content;
                Ok(post.clone())
            }
            None => Err(AppError::NotFound("Post".to_string())),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut posts = self.write();
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(AppError::NotFound("Post".to_string()));
        }
        Ok(())
    }
}

pub struct InMemoryTodoRepo {
    todos: RwLock<Vec<Todo>>,
}

impl Default for InMemoryTodoRepo {
    fn default() -> Self {
        Self {
            todos: RwLock::new(vec![
                Todo {
                    id: 1,
                    text: "Learn Rust".to_string(),
                },
                Todo {
                    id: 2,
                    text: "Build a REST API".to_string(),
                },
            ]),
        }
    }
}

impl InMemoryTodoRepo {
    pub fn empty() -> Self {
        Self {
            todos: RwLock::new(Vec::new()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<Todo>> {
        self.todos.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Todo>> {
        self.todos.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TodoRepo for InMemoryTodoRepo {
    async fn list(&self) -> Result<Vec<Todo>> {
        Ok(self.read().clone())
    }

    /// Id is `len + 1`, computed while holding the write lock so two
    /// concurrent creates cannot observe the same length. Note that a
    /// delete followed by a create can still reuse an id, which matches
    /// the historical behavior of this collection.
    async fn create(&self, text: String) -> Result<Todo> {
        let mut todos = self.write();
        let todo = Todo {
            id: todos.len() as i64 + 1,
            text,
        };
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: i64, text: String) -> Result<Todo> {
        let mut todos = self.write();
        match todos.iter_mut().find(|todo| todo.id == id) {
            Some(todo) => {
                todo.text = text;
                Ok(todo.clone())
            }
            None => Err(AppError::NotFound("Todo".to_string())),
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut todos = self.write();
        let before = todos.len();
        todos.retain(|todo| todo.id != id);
        if todos.len() == before {
            return Err(AppError::NotFound("Todo".to_string()));
        }
        Ok(())
    }
}
