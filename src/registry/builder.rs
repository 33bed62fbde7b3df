//! Fluent route scope.

use crate::handler::Handler;
use crate::method::Method;
use crate::registry::Routes;

/// Declares several methods under one base path.
///
/// Obtained from [`Routes::route`]. Each method comes in two shapes:
/// `get(handler)` registers at the base path itself, `get_at(sub, handler)`
/// at `base + sub`. Every call forwards to the registry's
/// [`add_route`](Routes::add_route), so a builder on a mounted registry binds
/// immediately and one on an unmounted registry only declares.
pub struct RouteBuilder<'r, R: Routes> {
    base_path: String,
    routes: &'r mut R,
}

impl<'r, R: Routes> RouteBuilder<'r, R> {
    pub(crate) fn new(base_path: &str, routes: &'r mut R) -> Self {
        Self { base_path: base_path.to_owned(), routes }
    }

    pub fn base_path(&self) -> &str { &self.base_path }

    fn add(&mut self, method: Method, sub_path: &str, handler: impl Handler) -> &mut Self {
        let path = format!("{}{}", self.base_path, sub_path);
        self.routes.add_route(method, &path, handler);
        self
    }

    pub fn get(&mut self, handler: impl Handler) -> &mut Self {
        self.add(Method::Get, "", handler)
    }

    pub fn get_at(&mut self, sub_path: &str, handler: impl Handler) -> &mut Self {
        self.add(Method::Get, sub_path, handler)
    }

    pub fn post(&mut self, handler: impl Handler) -> &mut Self {
        self.add(Method::Post, "", handler)
    }

    pub fn post_at(&mut self, sub_path: &str, handler: impl Handler) -> &mut Self {
        self.add(Method::Post, sub_path, handler)
    }

    pub fn put(&mut self, handler: impl Handler) -> &mut Self {
        self.add(Method::Put, "", handler)
    }

    pub fn put_at(&mut self, sub_path: &str, handler: impl Handler) -> &mut Self {
        self.add(Method::Put, sub_path, handler)
    }

    pub fn patch(&mut self, handler: impl Handler) -> &mut Self {
        self.add(Method::Patch, "", handler)
    }

    pub fn patch_at(&mut self, sub_path: &str, handler: impl Handler) -> &mut Self {
        self.add(Method::Patch, sub_path, handler)
    }

    pub fn delete(&mut self, handler: impl Handler) -> &mut Self {
        self.add(Method::Delete, "", handler)
    }

    pub fn delete_at(&mut self, sub_path: &str, handler: impl Handler) -> &mut Self {
        self.add(Method::Delete, sub_path, handler)
    }
}
