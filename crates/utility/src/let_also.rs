/// Kotlin style scope functions, used to keep long builder chains flat.
pub trait LetAlso: Sized {
    /// Consumes `self` and maps it with `f`.
    fn let_owned<R, F>(self, f: F) -> R
    where
        F: FnOnce(Self) -> R,
    {
        f(self)
    }

    /// Maps a reference to `self` with `f`.
    fn let_ref<R, F>(&self, f: F) -> R
    where
        F: FnOnce(&Self) -> R,
    {
        f(self)
    }

    /// Runs `f` on `self` for its side effects and passes `self` on.
    fn also<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Self),
    {
        f(&mut self);
        self
    }
}

impl<T> LetAlso for T {}

#[cfg(test)]
mod tests {
    use super::LetAlso;

    #[test]
    fn let_owned_maps_value() {
        assert_eq!(21.let_owned(|x| x * 2), 42);
    }

    #[test]
    fn also_mutates_and_returns() {
        let v = vec![3, 1, 2].also(|v| v.sort());
        assert_eq!(v, vec![1, 2, 3]);
    }
}
