//! SQL executor
//!
//! The database connection lives with the caller: anything that can run a
//! SQL string implements [`Executor`]. [`SqlExecutor`] drives it with SQL
//! produced by a [`Generator`] or split out of a script by a [`BatchParser`].

use tracing::{debug, info};

use crate::batch::BatchParser;
use crate::config::RunnerConfig;
use crate::error::Result;
use crate::generator::Generator;
use crate::model::Expression;

/// Runs one SQL string against an open connection
pub trait Executor {
    fn execute(&mut self, sql: &str) -> Result<()>;
}

impl<E: Executor + ?Sized> Executor for &mut E {
    fn execute(&mut self, sql: &str) -> Result<()> {
        (**self).execute(sql)
    }
}

fn run<E: Executor>(executor: &mut E, dry_run: bool, sql: &str) -> Result<()> {
    if dry_run {
        info!(sql = sql, "Statement (dry run)");
        return Ok(());
    }

    info!(sql = sql, "Executing statement");
    executor.execute(sql)
}

/// Runs migration expressions and raw scripts through an [`Executor`]
pub struct SqlExecutor<E> {
    executor: E,
    generator: Generator,
    parser: BatchParser,
    dry_run: bool,
}

impl<E: Executor> SqlExecutor<E> {
    /// Create an executor using the generator's dialect for script splitting
    pub fn new(executor: E, generator: Generator) -> Self {
        let parser = BatchParser::for_dialect(generator.dialect());
        Self {
            executor,
            generator,
            parser,
            dry_run: false,
        }
    }

    /// Apply the runner settings from the configuration file
    pub fn configure(mut self, config: &RunnerConfig) -> Self {
        self.dry_run = config.dry_run;
        self.parser = self.parser.strip_comments(config.strip_comments);
        self
    }

    /// Log statements instead of executing them
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_parser(mut self, parser: BatchParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn parser(&self) -> &BatchParser {
        &self.parser
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn into_inner(self) -> E {
        self.executor
    }

    /// Generate and run one expression
    ///
    /// Raw SQL expressions are split into batches first. An expression the
    /// dialect emulates as a no-op runs nothing.
    pub fn execute_expression(&mut self, expression: &Expression) -> Result<()> {
        match expression {
            Expression::ExecuteSql(e) => self.execute_script(&e.sql).map(|_| ()),
            Expression::PerformDbOperation(e) => {
                debug!(
                    description = e.description.as_deref().unwrap_or(""),
                    "Database operations run through perform()"
                );
                Ok(())
            }
            _ => {
                let sql = self.generator.generate(expression)?;
                if sql.trim().is_empty() {
                    debug!(kind = expression.kind(), "No SQL generated");
                    return Ok(());
                }
                run(&mut self.executor, self.dry_run, &sql)
            }
        }
    }

    /// Run expressions in order, stopping at the first failure
    pub fn execute_expressions(&mut self, expressions: &[Expression]) -> Result<()> {
        for (i, expression) in expressions.iter().enumerate() {
            debug!(expression_number = i + 1, kind = expression.kind(), "Running expression");
            self.execute_expression(expression)?;
        }

        Ok(())
    }

    /// Split a script and run every batch, repeating `GO n` batches `n` times
    ///
    /// Returns the number of statements run.
    pub fn execute_script(&mut self, script: &str) -> Result<usize> {
        let mut executed = 0;

        for batch in self.parser.batches(script) {
            for _ in 0..batch.repeat_count() {
                run(&mut self.executor, self.dry_run, &batch.sql)?;
                executed += 1;
            }
        }

        debug!(statements = executed, "Script finished");
        Ok(executed)
    }

    /// Run a caller-supplied operation directly against the executor
    pub fn perform<F>(&mut self, operation: F) -> Result<()>
    where
        F: FnOnce(&mut E) -> Result<()>,
    {
        if self.dry_run {
            info!("Skipping database operation (dry run)");
            return Ok(());
        }

        operation(&mut self.executor)
    }
}
