//! Macros for ergonomic state tree construction.

/// Build a [`StateTree`](crate::core::StateTree) from nested literals.
///
/// Keys are identifiers or string literals; values are `true`/`false` for
/// states or a braced block for a group.
///
/// # Example
///
/// ```
/// use clickthrough::state_tree;
///
/// let tree = state_tree! {
///     screen: {
///         welcome: true,
///         "login-filled": false,
///     },
///     menu: false,
/// };
///
/// let names: Vec<String> = tree.leaves().iter().map(|l| l.full_name()).collect();
/// assert_eq!(names, vec!["screen:welcome", "screen:login-filled", "menu"]);
/// ```
#[macro_export]
macro_rules! state_tree {
    (@node { $($inner:tt)* }) => {
        $crate::core::StateNode::Branch($crate::state_tree!($($inner)*))
    };
    (@node $active:expr) => {
        $crate::core::StateNode::Leaf($active)
    };
    ($($key:tt : $value:tt),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut tree = $crate::core::StateTree::new();
        $(
            tree.insert(
                $crate::core::StateTree::token_key(stringify!($key)),
                $crate::state_tree!(@node $value),
            );
        )*
        tree
    }};
}
